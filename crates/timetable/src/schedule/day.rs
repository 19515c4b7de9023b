//! Ordered periods of a single weekday.
//!
//! ## Invariants
//!
//! - `period` fields are dense and 1-based after every add and remove
//! - After an edit at index `k`, every period after `k` starts when its
//!   predecessor ends
//! - An edit either applies in full (including its cascade) or not at all

use super::clock::ClockTime;
use super::period::{ClassPeriod, PeriodField};
use crate::error::TimetableError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The ordered list of class periods for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySchedule {
    periods: Vec<ClassPeriod>,
}

impl DaySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps periods as-is, without renumbering or retiming.
    pub fn from_periods(periods: Vec<ClassPeriod>) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> &[ClassPeriod] {
        &self.periods
    }

    pub fn get(&self, index: usize) -> Option<&ClassPeriod> {
        self.periods.get(index)
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Appends a default period that starts when the current last period
    /// ends, or at 08:00 on an empty day. Existing periods are untouched.
    pub fn add_period(&mut self) -> &ClassPeriod {
        let start = self
            .periods
            .last()
            .map(|p| p.end_time)
            .unwrap_or(ClockTime::DAY_START);
        let number = self.periods.len() as u32 + 1;
        self.periods.push(ClassPeriod::new(number, start));
        debug!(period = number, start = %start, "Added period");
        &self.periods[self.periods.len() - 1]
    }

    /// Deletes the period at `index` and renumbers the rest `1..N`.
    ///
    /// Start and end times of the remaining periods are left as they were.
    /// Returns `None` (and changes nothing) if `index` is out of range.
    pub fn remove_period(&mut self, index: usize) -> Option<ClassPeriod> {
        if index >= self.periods.len() {
            warn!(index, len = self.periods.len(), "Ignoring removal of missing period");
            return None;
        }
        let mut remaining = self.periods.clone();
        let removed = remaining.remove(index);
        for (i, period) in remaining.iter_mut().enumerate() {
            period.period = i as u32 + 1;
        }
        self.periods = remaining;
        Some(removed)
    }

    /// Applies `field` to the period at `index`, then walks forward through
    /// the rest of the day so that each later period starts at its
    /// predecessor's end time and ends after its own duration and count.
    ///
    /// The walk runs for every edit, timing-related or not, and never
    /// touches periods before `index`. On error the day is left unchanged.
    /// An out-of-range `index` is ignored.
    pub fn edit_field(&mut self, index: usize, field: PeriodField) -> Result<(), TimetableError> {
        if index >= self.periods.len() {
            warn!(index, len = self.periods.len(), "Ignoring edit of missing period");
            return Ok(());
        }

        let mut updated = self.periods.clone();
        field.apply(&mut updated[index])?;
        cascade_from(&mut updated, index);

        debug!(
            index,
            cascaded = updated.len() - index - 1,
            "Applied period edit"
        );
        self.periods = updated;
        Ok(())
    }

    /// Returns true if every period after the first starts exactly when the
    /// previous one ends.
    pub fn is_contiguous(&self) -> bool {
        self.periods
            .windows(2)
            .all(|pair| pair[1].start_time == pair[0].end_time)
    }

    /// Returns true if `period` fields run `1..=len` in order.
    pub fn is_densely_numbered(&self) -> bool {
        self.periods
            .iter()
            .enumerate()
            .all(|(i, p)| p.period == i as u32 + 1)
    }
}

/// Re-derives start and end times of every period after `index`.
fn cascade_from(periods: &mut [ClassPeriod], index: usize) {
    for i in index + 1..periods.len() {
        let start = periods[i - 1].end_time;
        let current = &mut periods[i];
        current.start_time = start;
        current.end_time = current.expected_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::period::ClassType;

    fn day_with(count: usize) -> DaySchedule {
        let mut day = DaySchedule::new();
        for _ in 0..count {
            day.add_period();
        }
        day
    }

    fn times(day: &DaySchedule) -> Vec<(String, String)> {
        day.periods()
            .iter()
            .map(|p| (p.start_time.to_string(), p.end_time.to_string()))
            .collect()
    }

    #[test]
    fn test_add_period_on_empty_day_starts_at_eight() {
        let mut day = DaySchedule::new();
        let p = day.add_period();
        assert_eq!(p.start_time.to_string(), "08:00");
        assert_eq!(p.end_time.to_string(), "09:00");
        assert_eq!(p.period, 1);
    }

    #[test]
    fn test_add_period_chains_and_leaves_existing_alone() {
        let mut day = day_with(1);
        day.edit_field(0, PeriodField::Duration(90)).unwrap();
        let before = day.periods()[0].clone();

        let added = day.add_period().clone();
        assert_eq!(day.len(), 2);
        assert_eq!(added.period, 2);
        assert_eq!(added.start_time.to_string(), "09:30");
        assert_eq!(added.end_time.to_string(), "10:30");
        assert_eq!(day.periods()[0], before);
    }

    #[test]
    fn test_edit_duration_cascades_forward() {
        let mut day = day_with(2);
        day.edit_field(0, PeriodField::Duration(90)).unwrap();
        assert_eq!(
            times(&day),
            vec![
                ("08:00".to_string(), "09:30".to_string()),
                ("09:30".to_string(), "10:30".to_string()),
            ]
        );
    }

    #[test]
    fn test_edit_first_start_time_shifts_whole_day() {
        let mut day = day_with(3);
        day.edit_field(2, PeriodField::RepeatCount(2)).unwrap();
        day.edit_field(0, PeriodField::StartTime("09:15".to_string()))
            .unwrap();
        assert_eq!(
            times(&day),
            vec![
                ("09:15".to_string(), "10:15".to_string()),
                ("10:15".to_string(), "11:15".to_string()),
                ("11:15".to_string(), "13:15".to_string()),
            ]
        );
        assert!(day.is_contiguous());
    }

    #[test]
    fn test_cascade_never_touches_earlier_periods() {
        let mut day = day_with(3);
        let first = day.periods()[0].clone();
        day.edit_field(1, PeriodField::StartTime("13:00".to_string()))
            .unwrap();
        assert_eq!(day.periods()[0], first);
        assert_eq!(day.periods()[1].start_time.to_string(), "13:00");
        assert_eq!(day.periods()[2].start_time.to_string(), "14:00");
    }

    #[test]
    fn test_edit_last_period_cascades_nothing() {
        let mut day = day_with(2);
        let first = day.periods()[0].clone();
        day.edit_field(1, PeriodField::Duration(45)).unwrap();
        assert_eq!(day.periods()[0], first);
        assert_eq!(day.periods()[1].end_time.to_string(), "09:45");
    }

    #[test]
    fn test_non_timing_edit_still_realigns_later_periods() {
        let mut periods = vec![
            ClassPeriod::new(1, ClockTime::from_hm(8, 0)),
            ClassPeriod::new(2, ClockTime::from_hm(10, 0)),
        ];
        periods[1].end_time = ClockTime::from_hm(11, 0);
        let mut day = DaySchedule::from_periods(periods);
        assert!(!day.is_contiguous());

        day.edit_field(0, PeriodField::CourseName("Maths".to_string()))
            .unwrap();
        assert!(day.is_contiguous());
        assert_eq!(day.periods()[1].start_time.to_string(), "09:00");
        assert_eq!(day.periods()[1].end_time.to_string(), "10:00");
    }

    #[test]
    fn test_invalid_start_time_leaves_day_unchanged() {
        let mut day = day_with(3);
        let snapshot = day.clone();
        let err = day
            .edit_field(0, PeriodField::StartTime("8 o'clock".to_string()))
            .unwrap_err();
        assert!(matches!(err, TimetableError::InvalidTimeFormat { .. }));
        assert_eq!(day, snapshot);
    }

    #[test]
    fn test_remove_renumbers_without_retiming() {
        let mut day = day_with(3);
        let b = day.periods()[1].clone();
        let c = day.periods()[2].clone();

        let removed = day.remove_period(0).unwrap();
        assert_eq!(removed.period, 1);
        assert_eq!(day.len(), 2);
        assert!(day.is_densely_numbered());
        assert_eq!(day.periods()[0].start_time, b.start_time);
        assert_eq!(day.periods()[0].end_time, b.end_time);
        assert_eq!(day.periods()[1].start_time, c.start_time);
        assert_eq!(day.periods()[1].course_name, c.course_name);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut day = day_with(1);
        let snapshot = day.clone();
        assert!(day.remove_period(5).is_none());
        assert!(day.edit_field(5, PeriodField::Duration(30)).is_ok());
        assert_eq!(day, snapshot);
    }

    #[test]
    fn test_mixed_sequence_keeps_invariants() {
        let mut day = DaySchedule::new();
        day.add_period();
        day.add_period();
        day.edit_field(0, PeriodField::Duration(45)).unwrap();
        day.add_period();
        day.edit_field(1, PeriodField::ClassType(ClassType::Free))
            .unwrap();
        day.edit_field(1, PeriodField::RepeatCount(3)).unwrap();
        day.add_period();
        day.edit_field(0, PeriodField::StartTime("07:30".to_string()))
            .unwrap();

        assert!(day.is_contiguous());
        assert!(day.is_densely_numbered());
        assert_eq!(day.periods()[3].end_time.to_string(), "13:15");
    }
}
