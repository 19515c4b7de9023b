/// Holiday calendar entries and grouping for display
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// One stored holiday date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
}

/// Body of `POST /holiday/add`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHoliday {
    pub name: String,
    pub date: NaiveDate,
}

/// Holidays sharing a name, shown as one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayGroup {
    /// Id of the first entry seen with this name
    pub id: String,
    pub name: String,
    pub dates: Vec<NaiveDate>,
}

impl HolidayGroup {
    /// `"start - end"` for more than two dates, otherwise a comma-joined list.
    pub fn date_label(&self) -> String {
        match self.dates.as_slice() {
            [first, .., last] if self.dates.len() > 2 => format!("{} - {}", first, last),
            dates => dates
                .iter()
                .map(NaiveDate::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Groups holidays by name in first-seen order. Dates within a group are
/// sorted.
pub fn combine_holidays(holidays: Vec<Holiday>) -> Vec<HolidayGroup> {
    let mut groups: Vec<HolidayGroup> = Vec::new();
    for holiday in holidays {
        match groups.iter_mut().find(|g| g.name == holiday.name) {
            Some(group) => group.dates.push(holiday.date),
            None => groups.push(HolidayGroup {
                id: holiday.id,
                name: holiday.name,
                dates: vec![holiday.date],
            }),
        }
    }
    for group in &mut groups {
        group.dates.sort();
    }
    groups
}

/// One date per day starting at `start`. A `day_count` of zero counts as one.
pub fn expand_dates(start: NaiveDate, day_count: u32) -> Vec<NaiveDate> {
    (0..day_count.max(1))
        .filter_map(|offset| start.checked_add_days(Days::new(u64::from(offset))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn holiday(id: &str, name: &str, d: &str) -> Holiday {
        Holiday {
            id: id.to_string(),
            name: name.to_string(),
            date: date(d),
        }
    }

    #[test]
    fn test_expand_dates_crosses_month_end() {
        let dates = expand_dates(date("2025-01-30"), 3);
        assert_eq!(
            dates,
            vec![date("2025-01-30"), date("2025-01-31"), date("2025-02-01")]
        );
        assert_eq!(expand_dates(date("2025-01-30"), 0).len(), 1);
    }

    #[test]
    fn test_combine_groups_by_name() {
        let groups = combine_holidays(vec![
            holiday("a1", "Puja", "2025-10-02"),
            holiday("b1", "Republic Day", "2025-01-26"),
            holiday("a2", "Puja", "2025-10-01"),
            holiday("a3", "Puja", "2025-10-03"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "a1");
        assert_eq!(groups[0].date_label(), "2025-10-01 - 2025-10-03");
        assert_eq!(groups[1].date_label(), "2025-01-26");
    }

    #[test]
    fn test_two_dates_are_listed() {
        let groups = combine_holidays(vec![
            holiday("x", "Holi", "2025-03-14"),
            holiday("y", "Holi", "2025-03-15"),
        ]);
        assert_eq!(groups[0].date_label(), "2025-03-14, 2025-03-15");
    }

    #[test]
    fn test_wire_format() {
        let h: Holiday =
            serde_json::from_str(r#"{"_id": "65f0", "name": "Holi", "date": "2025-03-14"}"#)
                .unwrap();
        assert_eq!(h.id, "65f0");
        assert_eq!(h.date, date("2025-03-14"));
    }
}
