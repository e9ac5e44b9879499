use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::calendar;

/// A calendar day of the planning month, with the derived fields every
/// constraint keeps asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Day {
    pub date: NaiveDate,
    pub iso_week: u32,
    pub weekday: Weekday,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            iso_week: calendar::iso_week(date),
            weekday: date.weekday(),
        }
    }

    pub fn is_sunday(&self) -> bool {
        self.weekday == Weekday::Sun
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_derives_week_and_weekday() {
        let day = Day::new(NaiveDate::from_ymd_opt(2025, 4, 6).unwrap());
        assert!(day.is_sunday());
        assert_eq!(day.iso_week, 14);

        let monday = Day::new(NaiveDate::from_ymd_opt(2025, 4, 7).unwrap());
        assert!(!monday.is_sunday());
        assert_eq!(monday.iso_week, 15);
    }
}
