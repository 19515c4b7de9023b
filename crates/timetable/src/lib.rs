//! Weekly class timetable editing, with a client for the remote schedule
//! store and its PDF extraction service.
//!
//! The core is [`schedule`]: a per-day engine that keeps every period's
//! start and end time consistent with the period before it.
//! [`editor::ScheduleEditor`] owns a whole form on top of it, and
//! [`upload`] turns the extraction service's event stream into a
//! replacement week.

pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod holiday;
pub mod identity;
pub mod schedule;
pub mod upload;

pub use api::ApiClient;
pub use config::TimetableConfig;
pub use editor::{Notice, NoticeLevel, PendingAction, ScheduleEditor};
pub use error::TimetableError;
pub use schedule::{compute_end_time, ClassPeriod, DaySchedule, WeekSchedule, Weekday};
