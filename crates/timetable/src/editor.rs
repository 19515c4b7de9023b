//! The timetable form: identity fields, the week being edited, the pending
//! confirmation and the notices raised along the way.
//!
//! [`ScheduleEditor`] is the single owner of that state. Everything that
//! changes it goes through a method here, and remote failures are recovered
//! by pushing a [`Notice`] while leaving the state as it was.

use crate::api::{ApiClient, Instructor, SaveRequest, ScheduleRecord};
use crate::error::TimetableError;
use crate::identity::{can_submit, KnownIds, ScheduleIdentity};
use crate::schedule::{ClassPeriod, DaySet, PeriodField, WeekSchedule, Weekday};
use crate::upload::UploadIngestor;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, warn};

/// Message shown when the roster lookup comes back empty-handed.
pub const NO_INSTRUCTORS: &str = "No instructors found for the selected criteria";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// A destructive action waiting for the user to confirm or cancel it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingAction {
    #[default]
    None,
    DeleteClass {
        day: Weekday,
        index: usize,
    },
    DeleteRecord {
        id: String,
    },
}

/// What confirming the pending action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Nothing was pending
    Nothing,
    /// A period was removed locally; `None` if the target no longer existed
    ClassRemoved(Option<ClassPeriod>),
    /// The record must now be deleted remotely
    DeleteRecord(String),
}

/// Owns all state of one timetable form.
#[derive(Debug, Clone)]
pub struct ScheduleEditor {
    day_set: DaySet,
    identity: ScheduleIdentity,
    /// Id of the record loaded from the server, if any
    selected_id: Option<String>,
    known_ids: KnownIds,
    week: WeekSchedule,
    pending: PendingAction,
    instructors: Vec<Instructor>,
    notices: VecDeque<Notice>,
}

impl ScheduleEditor {
    /// An empty form covering the days in `day_set`.
    pub fn new(day_set: DaySet) -> Self {
        Self {
            week: WeekSchedule::empty(&day_set),
            day_set,
            identity: ScheduleIdentity::default(),
            selected_id: None,
            known_ids: KnownIds::new(),
            pending: PendingAction::None,
            instructors: Vec::new(),
            notices: VecDeque::new(),
        }
    }

    pub fn day_set(&self) -> &DaySet {
        &self.day_set
    }

    pub fn identity(&self) -> &ScheduleIdentity {
        &self.identity
    }

    pub fn set_university(&mut self, university: impl Into<String>) {
        self.identity.university = university.into();
    }

    pub fn set_program(&mut self, program: impl Into<String>) {
        self.identity.program = program.into();
    }

    pub fn set_semester(&mut self, semester: impl Into<String>) {
        self.identity.semester = semester.into();
    }

    pub fn set_section(&mut self, section: impl Into<String>) {
        self.identity.section = section.into();
    }

    /// The id derived from the current identity fields.
    pub fn id(&self) -> Option<String> {
        self.identity.derive_id()
    }

    /// False when saving would overwrite a different existing record.
    pub fn can_submit(&self) -> bool {
        match self.id() {
            Some(id) => can_submit(&id, &self.known_ids, self.selected_id.as_deref()),
            None => false,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn known_ids(&self) -> &KnownIds {
        &self.known_ids
    }

    pub fn set_known_ids(&mut self, ids: impl IntoIterator<Item = String>) {
        self.known_ids = ids.into_iter().collect();
    }

    pub fn week(&self) -> &WeekSchedule {
        &self.week
    }

    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    pub fn pending(&self) -> &PendingAction {
        &self.pending
    }

    pub fn select_day(&mut self, day: Weekday) -> bool {
        self.week.select_day(day)
    }

    pub fn add_period(&mut self, day: Weekday) -> Option<&ClassPeriod> {
        self.week.add_period(day)
    }

    pub fn edit_field(
        &mut self,
        day: Weekday,
        index: usize,
        field: PeriodField,
    ) -> Result<(), TimetableError> {
        self.week.edit_field(day, index, field)
    }

    /// Asks for confirmation before removing a period. Replaces whatever
    /// was pending before.
    pub fn request_remove_period(&mut self, day: Weekday, index: usize) {
        self.pending = PendingAction::DeleteClass { day, index };
    }

    /// Asks for confirmation before deleting the loaded record.
    pub fn request_delete_record(&mut self) -> Result<(), TimetableError> {
        let id = self
            .selected_id
            .clone()
            .ok_or(TimetableError::NothingSelected)?;
        self.pending = PendingAction::DeleteRecord { id };
        Ok(())
    }

    pub fn cancel_pending(&mut self) {
        self.pending = PendingAction::None;
    }

    /// Resolves the pending action. Period removals are applied here;
    /// record deletions are handed back since they need the server.
    pub fn confirm_pending(&mut self) -> Confirmation {
        match std::mem::take(&mut self.pending) {
            PendingAction::None => Confirmation::Nothing,
            PendingAction::DeleteClass { day, index } => {
                Confirmation::ClassRemoved(self.week.remove_period(day, index))
            }
            PendingAction::DeleteRecord { id } => Confirmation::DeleteRecord(id),
        }
    }

    /// Replaces the form with a record fetched from the server.
    pub fn load_record(&mut self, id: impl Into<String>, record: ScheduleRecord) {
        let id = id.into();
        debug!(id = %id, "Loading schedule record");
        self.identity = record.identity();
        self.week.replace_all(record.schedule, &self.day_set);
        self.selected_id = Some(id);
        self.pending = PendingAction::None;
    }

    /// Replaces the week with an imported one, keeping the identity.
    pub fn apply_import(&mut self, week: WeekSchedule) {
        self.week.replace_all(week, &self.day_set);
    }

    /// Builds the body for saving the current form.
    pub fn submission(&self) -> Result<SaveRequest, TimetableError> {
        let id = self.id().ok_or(TimetableError::IncompleteIdentity)?;
        if !can_submit(&id, &self.known_ids, self.selected_id.as_deref()) {
            return Err(TimetableError::DuplicateIdentifier { id });
        }

        Ok(SaveRequest {
            university: self.identity.university.clone(),
            program: self.identity.program.clone(),
            section: self.identity.section.clone(),
            semester: self.identity.semester.clone(),
            id,
            schedule: self.week.clone(),
        })
    }

    /// Clears identity, selection and the week.
    pub fn reset(&mut self) {
        self.identity = ScheduleIdentity::default();
        self.selected_id = None;
        self.week = WeekSchedule::empty(&self.day_set);
        self.pending = PendingAction::None;
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            message: message.into(),
        });
    }

    /// Takes every queued notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Reloads the set of known ids.
    pub async fn refresh_ids(&mut self, client: &ApiClient) -> Result<(), TimetableError> {
        match client.fetch_ids().await {
            Ok(ids) => {
                debug!(count = ids.len(), "Refreshed known ids");
                self.set_known_ids(ids);
                Ok(())
            }
            Err(e) => Err(self.report("Error fetching IDs", e)),
        }
    }

    /// Loads the record `id` into the form.
    pub async fn select_record(
        &mut self,
        client: &ApiClient,
        id: &str,
    ) -> Result<(), TimetableError> {
        match client.find(id).await {
            Ok(record) => {
                self.load_record(id, record);
                Ok(())
            }
            Err(e) => Err(self.report("Error fetching schedule", e)),
        }
    }

    /// Saves the form, then refreshes the known ids.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<(), TimetableError> {
        let request = match self.submission() {
            Ok(request) => request,
            Err(e) => return Err(self.report("Cannot submit", e)),
        };

        match client.save(&request).await {
            Ok(message) => {
                info!(id = %request.id, "Schedule saved");
                self.notify(NoticeLevel::Success, message);
                self.selected_id = Some(request.id);
            }
            Err(e) => return Err(self.report("Error saving schedule", e)),
        }

        self.refresh_ids(client).await
    }

    /// Confirms the pending action, deleting the record remotely if that is
    /// what was pending.
    pub async fn confirm(&mut self, client: &ApiClient) -> Result<Confirmation, TimetableError> {
        let confirmation = self.confirm_pending();
        let Confirmation::DeleteRecord(id) = &confirmation else {
            return Ok(confirmation);
        };

        match client.delete(id).await {
            Ok(message) => {
                info!(id = %id, "Schedule deleted");
                self.notify(NoticeLevel::Success, message);
                self.reset();
            }
            Err(e) => return Err(self.report("Error deleting schedule", e)),
        }

        self.refresh_ids(client).await?;
        Ok(confirmation)
    }

    /// Reloads the instructor roster for the current university and
    /// program. Does nothing while both are empty.
    pub async fn refresh_instructors(&mut self, client: &ApiClient) -> Result<(), TimetableError> {
        let university = self.identity.university.clone();
        let program = self.identity.program.clone();
        if university.is_empty() && program.is_empty() {
            self.instructors.clear();
            return Ok(());
        }

        match client.instructors(&university, &program).await {
            Ok(instructors) => {
                self.instructors = instructors;
                Ok(())
            }
            Err(TimetableError::UnexpectedResponse { status: 404, .. }) => {
                self.instructors.clear();
                self.notify(NoticeLevel::Warning, NO_INSTRUCTORS);
                Ok(())
            }
            Err(e) => Err(self.report("Error fetching instructors", e)),
        }
    }

    /// Uploads a PDF and, if extraction yields a timetable, replaces the
    /// week with it.
    ///
    /// Dropping the returned future cancels the upload and leaves the week
    /// untouched.
    pub async fn import_pdf(
        &mut self,
        client: &ApiClient,
        file_name: &str,
        pdf: Vec<u8>,
        ingestor: &mut UploadIngestor,
    ) -> Result<(), TimetableError> {
        ingestor.start();
        let outcome = match client.extract_pdf(file_name, pdf).await {
            Ok(stream) => ingestor.ingest(stream).await,
            Err(e) => ingestor.fail(e.to_string()),
        };

        match outcome {
            Ok(week) => {
                self.apply_import(week);
                self.notify(NoticeLevel::Success, "Timetable imported");
                Ok(())
            }
            Err(e) => Err(self.report("Import failed", e)),
        }
    }

    fn report(&mut self, context: &str, error: TimetableError) -> TimetableError {
        warn!(error = %error, "{}", context);
        self.notify(NoticeLevel::Error, format!("{}: {}", context, error));
        error
    }
}
