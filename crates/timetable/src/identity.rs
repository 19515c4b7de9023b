//! Schedule identifiers and the create-vs-update guard.
//!
//! A record's id is never entered directly: it is derived from the four
//! identity fields whenever all of them are filled in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Semesters offered in the identity form.
pub const SEMESTERS: std::ops::RangeInclusive<u8> = 1..=9;

const ROMAN: [&str; 9] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX"];

/// The four form fields that name a schedule record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleIdentity {
    pub university: String,
    pub program: String,
    pub semester: String,
    pub section: String,
}

impl ScheduleIdentity {
    pub fn new(
        university: impl Into<String>,
        program: impl Into<String>,
        semester: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            university: university.into(),
            program: program.into(),
            semester: semester.into(),
            section: section.into(),
        }
    }

    /// The id this identity maps to, if every field is filled in.
    pub fn derive_id(&self) -> Option<String> {
        derive_id(&self.university, &self.program, &self.semester, &self.section)
    }

    pub fn is_complete(&self) -> bool {
        self.derive_id().is_some()
    }
}

/// Joins the identity fields as `university-program-semester-section`.
///
/// Returns `None` if any of them is empty.
pub fn derive_id(university: &str, program: &str, semester: &str, section: &str) -> Option<String> {
    let parts = [university, program, semester, section];
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts.join("-"))
}

/// Returns false when `derived_id` already names a record other than the
/// one currently loaded, which would overwrite it.
pub fn can_submit(derived_id: &str, known_ids: &KnownIds, selected_id: Option<&str>) -> bool {
    !(known_ids.contains(derived_id) && selected_id != Some(derived_id))
}

/// Label for a semester in the picker, e.g. `"3 - III"`.
pub fn semester_label(semester: u8) -> Option<String> {
    let roman = ROMAN.get(usize::from(semester).checked_sub(1)?)?;
    Some(format!("{} - {}", semester, roman))
}

/// Ids that already exist on the server, kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownIds(BTreeSet<String>);

impl KnownIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for KnownIds {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
