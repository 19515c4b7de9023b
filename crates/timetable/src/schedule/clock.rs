//! Wall-clock arithmetic for period start and end times.
//!
//! Times are plain minute counts from midnight rendered as zero-padded
//! `HH:MM`. Adding minutes never wraps at 24 hours: a class that runs past
//! midnight ends at e.g. `"24:30"`. User-entered times are parsed strictly
//! (hours in `0..24`), while times read back from the wire accept the
//! overflowed form so that engine-produced values round-trip.

use crate::error::TimetableError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A time of day in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u32);

impl ClockTime {
    /// Start time given to the first period of an empty day.
    pub const DAY_START: ClockTime = ClockTime(8 * 60);

    /// Builds a time from hours and minutes. Hours are not bounded.
    pub const fn from_hm(hours: u32, minutes: u32) -> Self {
        Self(hours * 60 + minutes)
    }

    /// Parses a user-entered `HH:MM` time.
    ///
    /// Fails with [`TimetableError::InvalidTimeFormat`] unless the input is
    /// two colon-separated integers with hours in `0..24` and minutes in
    /// `0..60`.
    pub fn parse(value: &str) -> Result<Self, TimetableError> {
        let (hours, minutes) = split_hm(value)?;
        if hours >= 24 {
            return Err(invalid(value));
        }
        Ok(Self::from_hm(hours, minutes))
    }

    /// Parses a stored time, allowing hours past 23.
    pub fn parse_stored(value: &str) -> Result<Self, TimetableError> {
        let (hours, minutes) = split_hm(value)?;
        hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(minutes))
            .map(Self)
            .ok_or_else(|| invalid(value))
    }

    pub fn hours(self) -> u32 {
        self.0 / 60
    }

    pub fn minutes(self) -> u32 {
        self.0 % 60
    }

    /// Total minutes since midnight.
    pub fn as_minutes(self) -> u32 {
        self.0
    }

    /// Returns this time moved forward by `minutes`.
    pub fn add_minutes(self, minutes: u32) -> Self {
        Self(self.0.saturating_add(minutes))
    }

    /// End of a block of `repeat_count` back-to-back slots of
    /// `duration_minutes` each, starting at `self`.
    pub fn end_after(self, duration_minutes: u32, repeat_count: u32) -> Self {
        self.add_minutes(duration_minutes.saturating_mul(repeat_count))
    }
}

fn invalid(value: &str) -> TimetableError {
    TimetableError::InvalidTimeFormat {
        value: value.to_string(),
    }
}

fn split_hm(value: &str) -> Result<(u32, u32), TimetableError> {
    let (h, m) = value.split_once(':').ok_or_else(|| invalid(value))?;
    let hours: u32 = h.parse().map_err(|_| invalid(value))?;
    let minutes: u32 = m.parse().map_err(|_| invalid(value))?;
    if minutes >= 60 {
        return Err(invalid(value));
    }
    Ok((hours, minutes))
}

/// Computes the end time of a period from its start time, slot length and
/// number of consecutive slots.
///
/// ```
/// use timetable::schedule::compute_end_time;
///
/// assert_eq!(compute_end_time("08:00", 45, 2).unwrap(), "09:30");
/// ```
pub fn compute_end_time(
    start_time: &str,
    duration_minutes: u32,
    repeat_count: u32,
) -> Result<String, TimetableError> {
    let start = ClockTime::parse(start_time)?;
    Ok(start.end_after(duration_minutes, repeat_count).to_string())
}

impl Default for ClockTime {
    fn default() -> Self {
        Self::DAY_START
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minutes())
    }
}

impl FromStr for ClockTime {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_stored(&raw).map_err(serde::de::Error::custom)
    }
}
