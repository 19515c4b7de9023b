//! The week aggregate: one [`DaySchedule`] per configured weekday plus the
//! currently viewed day.

use super::day::DaySchedule;
use super::period::{ClassPeriod, PeriodField};
use crate::error::TimetableError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Day of the week, ordered Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown weekday: {}", s))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// The weekdays a timetable covers, Monday first and without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct DaySet(Vec<Weekday>);

impl From<Vec<Weekday>> for DaySet {
    fn from(days: Vec<Weekday>) -> Self {
        Self::from_days(days)
    }
}

impl From<DaySet> for Vec<Weekday> {
    fn from(set: DaySet) -> Self {
        set.0
    }
}

impl DaySet {
    /// Monday through Saturday.
    pub fn six_day() -> Self {
        Self(Weekday::ALL[..6].to_vec())
    }

    /// Monday through Sunday.
    pub fn seven_day() -> Self {
        Self(Weekday::ALL.to_vec())
    }

    /// Builds a set from arbitrary days, sorted and without duplicates.
    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut days: Vec<Weekday> = days.into_iter().collect();
        days.sort();
        days.dedup();
        Self(days)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn days(&self) -> &[Weekday] {
        &self.0
    }
}

impl Default for DaySet {
    fn default() -> Self {
        Self::six_day()
    }
}

/// One day schedule per weekday, plus which day is being viewed.
///
/// Serializes as a JSON object keyed by weekday name; the viewed day is UI
/// state and is not part of the wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekSchedule {
    days: BTreeMap<Weekday, DaySchedule>,
    #[serde(skip)]
    current_day: Weekday,
}

impl WeekSchedule {
    /// An empty schedule with one empty day per entry in `day_set`.
    pub fn empty(day_set: &DaySet) -> Self {
        Self {
            days: day_set
                .days()
                .iter()
                .map(|d| (*d, DaySchedule::new()))
                .collect(),
            current_day: day_set.days().first().copied().unwrap_or_default(),
        }
    }

    pub fn day(&self, day: Weekday) -> Option<&DaySchedule> {
        self.days.get(&day)
    }

    /// Days in Monday-first order.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        self.days.iter().map(|(d, s)| (*d, s))
    }

    pub fn current_day(&self) -> Weekday {
        self.current_day
    }

    pub fn current(&self) -> Option<&DaySchedule> {
        self.days.get(&self.current_day)
    }

    /// Switches the viewed day. Stored data is untouched. Returns false if
    /// the schedule has no such day.
    pub fn select_day(&mut self, day: Weekday) -> bool {
        if !self.days.contains_key(&day) {
            warn!(day = %day, "Cannot select a day outside the schedule");
            return false;
        }
        self.current_day = day;
        true
    }

    /// Adds a default period to `day`. Returns `None` if the schedule has
    /// no such day.
    pub fn add_period(&mut self, day: Weekday) -> Option<&ClassPeriod> {
        self.days.get_mut(&day).map(|d| d.add_period())
    }

    /// Removes the period at `index` from `day`.
    pub fn remove_period(&mut self, day: Weekday, index: usize) -> Option<ClassPeriod> {
        self.days.get_mut(&day)?.remove_period(index)
    }

    /// Edits one field of a period and cascades the rest of that day.
    pub fn edit_field(
        &mut self,
        day: Weekday,
        index: usize,
        field: PeriodField,
    ) -> Result<(), TimetableError> {
        match self.days.get_mut(&day) {
            Some(schedule) => schedule.edit_field(index, field),
            None => {
                warn!(day = %day, "Ignoring edit on a day outside the schedule");
                Ok(())
            }
        }
    }

    /// Replaces every day wholesale with the contents of `other`.
    ///
    /// Days from `day_set` that `other` lacks come back empty. The viewed
    /// day is kept.
    pub fn replace_all(&mut self, other: WeekSchedule, day_set: &DaySet) {
        let mut days = other.days;
        for day in day_set.days() {
            days.entry(*day).or_default();
        }
        info!(
            days = days.len(),
            periods = days.values().map(DaySchedule::len).sum::<usize>(),
            "Replaced week schedule"
        );
        self.days = days;
    }

    /// Total number of periods across all days.
    pub fn period_count(&self) -> usize {
        self.days.values().map(DaySchedule::len).sum()
    }
}
