//! Editor and client flows against an in-process mock of the schedule API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use timetable::config::ApiConfig;
use timetable::editor::{Confirmation, NO_INSTRUCTORS};
use timetable::schedule::{ClockTime, DaySet, PeriodField, Weekday};
use timetable::{ApiClient, NoticeLevel, ScheduleEditor, TimetableError};

#[derive(Default)]
struct Store {
    records: HashMap<String, Value>,
    roster_calls: usize,
}

type Shared = Arc<Mutex<Store>>;

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn not_found(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "message": message })))
}

async fn ids(State(store): State<Shared>) -> Json<Value> {
    let store = store.lock().unwrap();
    Json(json!({ "ids": store.records.keys().cloned().collect::<Vec<_>>() }))
}

async fn find(State(store): State<Shared>, Path(id): Path<String>) -> Reply {
    let store = store.lock().unwrap();
    store
        .records
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Schedule not found"))
}

async fn add(State(store): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let id = body["ID"].as_str().unwrap_or_default().to_string();
    store.lock().unwrap().records.insert(id, body);
    Json(json!({ "message": "Schedule saved successfully" }))
}

async fn remove(State(store): State<Shared>, Path(id): Path<String>) -> Reply {
    match store.lock().unwrap().records.remove(&id) {
        Some(_) => Ok(Json(json!({ "message": "Schedule deleted successfully" }))),
        None => Err(not_found("Schedule not found")),
    }
}

async fn teachers(
    State(store): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    store.lock().unwrap().roster_calls += 1;
    match params.get("university").map(String::as_str) {
        Some("BWU") => Ok(Json(json!([{ "name": "A. Sen" }, { "name": "R. Das" }]))),
        _ => Err(not_found("No teachers found")),
    }
}

async fn spawn(store: Shared) -> ApiClient {
    let app = Router::new()
        .route("/api/schedule/ids", get(ids))
        .route("/api/schedule/find/:id", get(find))
        .route("/api/schedule/add", post(add))
        .route("/api/schedule/delete/:id", delete(remove))
        .route("/api/schedule/teachers", get(teachers))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ApiConfig::with_base_url(&format!("http://{}/api/", addr)).unwrap();
    ApiClient::new(config).unwrap()
}

fn seeded() -> Shared {
    let mut store = Store::default();
    store.records.insert(
        "BWU-BCA-3-A".to_string(),
        json!({
            "university": "BWU",
            "program": "BCA",
            "section": "A",
            "semester": 3,
            "schedule": {
                "Monday": [{
                    "Period": 1, "Start_Time": "10:00", "End_Time": "11:30",
                    "Course_Name": "Operating Systems", "Instructor": "A. Sen",
                    "Room": "204", "Group": "Group 1", "Class_Duration": 90,
                    "Class_Count": 1, "Class_type": "Lab"
                }]
            }
        }),
    );
    Arc::new(Mutex::new(store))
}

fn filled_editor() -> ScheduleEditor {
    let mut editor = ScheduleEditor::new(DaySet::six_day());
    editor.set_university("BWU");
    editor.set_program("BCA");
    editor.set_semester("3");
    editor.set_section("A");
    editor
}

#[tokio::test]
async fn test_submit_then_reload() {
    let store = Arc::new(Mutex::new(Store::default()));
    let client = spawn(store.clone()).await;

    let mut editor = filled_editor();
    editor.add_period(Weekday::Monday);
    editor.add_period(Weekday::Monday);
    editor
        .edit_field(Weekday::Monday, 0, PeriodField::CourseName("Compilers".into()))
        .unwrap();
    editor
        .edit_field(Weekday::Monday, 0, PeriodField::StartTime("09:15".into()))
        .unwrap();

    editor.refresh_ids(&client).await.unwrap();
    editor.submit(&client).await.unwrap();

    assert!(editor.known_ids().contains("BWU-BCA-3-A"));
    assert_eq!(editor.selected_id(), Some("BWU-BCA-3-A"));
    let notices = editor.drain_notices();
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].message, "Schedule saved successfully");

    let mut reloaded = ScheduleEditor::new(DaySet::six_day());
    reloaded.select_record(&client, "BWU-BCA-3-A").await.unwrap();
    assert_eq!(reloaded.identity(), editor.identity());
    assert_eq!(
        reloaded.week().day(Weekday::Monday),
        editor.week().day(Weekday::Monday)
    );
    let monday = reloaded.week().day(Weekday::Monday).unwrap();
    assert_eq!(monday.periods()[1].start_time, ClockTime::from_hm(10, 15));
}

#[tokio::test]
async fn test_resubmitting_loaded_record_is_allowed() {
    let store = seeded();
    let client = spawn(store.clone()).await;

    let mut editor = ScheduleEditor::new(DaySet::six_day());
    editor.refresh_ids(&client).await.unwrap();
    editor.select_record(&client, "BWU-BCA-3-A").await.unwrap();
    assert_eq!(editor.identity().semester, "3");
    assert!(editor.can_submit());

    editor.add_period(Weekday::Monday);
    editor.submit(&client).await.unwrap();

    let stored = store.lock().unwrap().records["BWU-BCA-3-A"].clone();
    assert_eq!(stored["schedule"]["Monday"].as_array().unwrap().len(), 2);
    assert_eq!(stored["schedule"]["Monday"][1]["Start_Time"], "11:30");
}

#[tokio::test]
async fn test_duplicate_identifier_is_blocked() {
    let store = seeded();
    let client = spawn(store.clone()).await;

    let mut editor = filled_editor();
    editor.refresh_ids(&client).await.unwrap();
    editor.add_period(Weekday::Friday);

    let err = editor.submit(&client).await.unwrap_err();
    assert_eq!(
        err,
        TimetableError::DuplicateIdentifier {
            id: "BWU-BCA-3-A".to_string()
        }
    );
    assert_eq!(editor.drain_notices()[0].level, NoticeLevel::Error);

    let stored = store.lock().unwrap().records["BWU-BCA-3-A"].clone();
    assert!(stored["schedule"].get("Friday").is_none());
}

#[tokio::test]
async fn test_delete_record_after_confirmation() {
    let store = seeded();
    let client = spawn(store.clone()).await;

    let mut editor = ScheduleEditor::new(DaySet::six_day());
    editor.select_record(&client, "BWU-BCA-3-A").await.unwrap();
    editor.request_delete_record().unwrap();

    let confirmation = editor.confirm(&client).await.unwrap();
    assert_eq!(
        confirmation,
        Confirmation::DeleteRecord("BWU-BCA-3-A".to_string())
    );
    assert!(store.lock().unwrap().records.is_empty());
    assert_eq!(editor.selected_id(), None);
    assert_eq!(editor.id(), None);
    assert_eq!(editor.week().period_count(), 0);
    assert!(editor.known_ids().is_empty());
}

#[tokio::test]
async fn test_missing_record_leaves_form_untouched() {
    let client = spawn(seeded()).await;

    let mut editor = filled_editor();
    editor.add_period(Weekday::Tuesday);

    let err = editor.select_record(&client, "BWU-BCA-9-Z").await.unwrap_err();
    assert_eq!(
        err,
        TimetableError::UnexpectedResponse {
            status: 404,
            message: "Schedule not found".to_string()
        }
    );
    assert_eq!(editor.selected_id(), None);
    assert_eq!(editor.week().period_count(), 1);

    let notices = editor.drain_notices();
    assert!(notices[0].message.starts_with("Error fetching schedule"));
}

#[tokio::test]
async fn test_instructor_roster_is_cached() {
    let store = seeded();
    let client = spawn(store.clone()).await;

    let mut editor = filled_editor();
    editor.refresh_instructors(&client).await.unwrap();
    editor.refresh_instructors(&client).await.unwrap();

    assert_eq!(editor.instructors().len(), 2);
    assert_eq!(store.lock().unwrap().roster_calls, 1);

    client.invalidate_roster("BWU", "BCA");
    editor.refresh_instructors(&client).await.unwrap();
    assert_eq!(store.lock().unwrap().roster_calls, 2);
}

#[tokio::test]
async fn test_instructor_roster_not_found() {
    let store = seeded();
    let client = spawn(store.clone()).await;

    let mut editor = ScheduleEditor::new(DaySet::six_day());
    editor.refresh_instructors(&client).await.unwrap();
    assert_eq!(store.lock().unwrap().roster_calls, 0);

    editor.set_university("XYZ");
    editor.refresh_instructors(&client).await.unwrap();
    assert!(editor.instructors().is_empty());

    let notices = editor.drain_notices();
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].message, NO_INSTRUCTORS);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ApiConfig::with_base_url(&format!("http://{}/api/", addr)).unwrap();
    let client = ApiClient::new(config).unwrap();

    let mut editor = ScheduleEditor::new(DaySet::six_day());
    let err = editor.refresh_ids(&client).await.unwrap_err();
    assert!(err.is_network());
    assert!(matches!(err, TimetableError::Network { .. }));
    assert!(editor.known_ids().is_empty());
    assert!(editor.drain_notices()[0]
        .message
        .starts_with("Error fetching IDs"));
}
