/// Request and response bodies of the remote schedule API
use crate::identity::ScheduleIdentity;
use crate::schedule::WeekSchedule;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `GET /schedule/ids`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdsResponse {
    pub ids: Vec<String>,
}

/// Generic `{ message }` reply of the mutating endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// A stored schedule as returned by `GET /schedule/find/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub university: String,
    pub program: String,
    pub section: String,
    /// Older records store the semester as a number
    #[serde(deserialize_with = "string_or_number")]
    pub semester: String,
    pub schedule: WeekSchedule,
}

impl ScheduleRecord {
    pub fn identity(&self) -> ScheduleIdentity {
        ScheduleIdentity::new(
            self.university.clone(),
            self.program.clone(),
            self.semester.clone(),
            self.section.clone(),
        )
    }
}

/// Body of `POST /schedule/add`; creates or overwrites the record `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub university: String,
    pub program: String,
    pub section: String,
    pub semester: String,
    #[serde(rename = "ID")]
    pub id: String,
    pub schedule: WeekSchedule,
}

/// One entry of `GET /schedule/teachers`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instructor {
    pub name: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
