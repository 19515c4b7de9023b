/// Types for a single class period and the edits that can be applied to it
use super::clock::ClockTime;
use crate::error::TimetableError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot lengths offered when editing a period, in minutes.
pub const STANDARD_DURATIONS: [u32; 7] = [30, 40, 45, 50, 60, 90, 120];

/// Repeat counts offered when editing a period.
pub const REPEAT_COUNTS: std::ops::RangeInclusive<u32> = 1..=5;

/// Length of a freshly added period.
pub const DEFAULT_DURATION: u32 = 60;

/// Which part of the section attends a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    #[default]
    All,
    #[serde(rename = "Group 1")]
    Group1,
    #[serde(rename = "Group 2")]
    Group2,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Group::All => "All",
            Group::Group1 => "Group 1",
            Group::Group2 => "Group 2",
        };
        f.pad(label)
    }
}

/// Kind of period. `Free` periods keep their course fields but the UI does
/// not require them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassType {
    #[default]
    Theory,
    Lab,
    Free,
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ClassType::Theory => "Theory",
            ClassType::Lab => "Lab",
            ClassType::Free => "Free",
        };
        f.pad(label)
    }
}

/// One scheduled slot within a day.
///
/// Field names on the wire follow the remote schedule API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPeriod {
    /// 1-based position within the day
    #[serde(rename = "Period")]
    pub period: u32,

    #[serde(rename = "Start_Time")]
    pub start_time: ClockTime,

    /// Always `start_time + duration_minutes * repeat_count` once the
    /// owning day has recomputed it
    #[serde(rename = "End_Time")]
    pub end_time: ClockTime,

    #[serde(rename = "Course_Name", default)]
    pub course_name: String,

    #[serde(rename = "Instructor", default)]
    pub instructor: String,

    /// Missing from records written by older clients
    #[serde(rename = "Building", default)]
    pub building: String,

    #[serde(rename = "Room", default)]
    pub room: String,

    #[serde(rename = "Group", default)]
    pub group: Group,

    #[serde(rename = "Class_type", default)]
    pub class_type: ClassType,

    #[serde(rename = "Class_Duration")]
    pub duration_minutes: u32,

    #[serde(rename = "Class_Count")]
    pub repeat_count: u32,
}

impl ClassPeriod {
    /// Creates a one-hour theory period for everyone, starting at `start_time`.
    pub fn new(period: u32, start_time: ClockTime) -> Self {
        Self {
            period,
            start_time,
            end_time: start_time.end_after(DEFAULT_DURATION, 1),
            course_name: String::new(),
            instructor: String::new(),
            building: String::new(),
            room: String::new(),
            group: Group::All,
            class_type: ClassType::Theory,
            duration_minutes: DEFAULT_DURATION,
            repeat_count: 1,
        }
    }

    /// End time implied by this period's own start, duration and count.
    pub fn expected_end(&self) -> ClockTime {
        self.start_time
            .end_after(self.duration_minutes, self.repeat_count)
    }

    pub fn is_free(&self) -> bool {
        self.class_type == ClassType::Free
    }
}

/// A single field edit on a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodField {
    /// Raw user input, validated as `HH:MM`
    StartTime(String),
    Duration(u32),
    RepeatCount(u32),
    CourseName(String),
    Instructor(String),
    Building(String),
    Room(String),
    Group(Group),
    ClassType(ClassType),
}

impl PeriodField {
    /// Returns true if this edit changes the period's own end time.
    pub fn affects_timing(&self) -> bool {
        matches!(
            self,
            PeriodField::StartTime(_) | PeriodField::Duration(_) | PeriodField::RepeatCount(_)
        )
    }

    /// Writes the value into `period`. Timing fields also refresh its end time.
    pub(crate) fn apply(self, period: &mut ClassPeriod) -> Result<(), TimetableError> {
        let retime = self.affects_timing();
        match self {
            PeriodField::StartTime(raw) => period.start_time = ClockTime::parse(&raw)?,
            PeriodField::Duration(minutes) => period.duration_minutes = minutes,
            PeriodField::RepeatCount(0) => {
                return Err(TimetableError::InvalidRepeatCount { value: 0 })
            }
            PeriodField::RepeatCount(count) => period.repeat_count = count,
            PeriodField::CourseName(v) => period.course_name = v,
            PeriodField::Instructor(v) => period.instructor = v,
            PeriodField::Building(v) => period.building = v,
            PeriodField::Room(v) => period.room = v,
            PeriodField::Group(v) => period.group = v,
            PeriodField::ClassType(v) => period.class_type = v,
        }
        if retime {
            period.end_time = period.expected_end();
        }
        Ok(())
    }
}

/// Human label for a slot length, e.g. `"45 minutes"`, `"1 hour"`,
/// `"1 hour 30 minutes"`, `"2 hours"`.
pub fn duration_label(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} minutes", minutes);
    }
    let hours = minutes / 60;
    let rest = minutes % 60;
    let unit = if hours > 1 { "hours" } else { "hour" };
    if rest > 0 {
        format!("{} {} {} minutes", hours, unit, rest)
    } else {
        format!("{} {}", hours, unit)
    }
}
