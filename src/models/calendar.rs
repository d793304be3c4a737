//! School week calendar.
//!
//! The school week runs Sunday to Thursday. Day indices follow
//! `chrono`'s Sunday-based numbering, so 0 = Sunday and 6 = Saturday;
//! only 0..5 are school days.

use chrono::{Datelike, Duration, NaiveDate};

/// Number of school days per week (Sunday to Thursday).
pub const SCHOOL_DAYS: usize = 5;

/// Day index of a date, 0 (Sunday) to 6 (Saturday).
pub fn day_index_for(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

/// Whether a day index is a school day.
#[inline]
pub fn is_school_day(day_index: usize) -> bool {
    day_index < SCHOOL_DAYS
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(day_index_for(date) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_index() {
        assert_eq!(day_index_for(date(2024, 9, 1)), 0); // Sunday
        assert_eq!(day_index_for(date(2024, 9, 5)), 4); // Thursday
        assert_eq!(day_index_for(date(2024, 9, 7)), 6); // Saturday
    }

    #[test]
    fn test_school_days() {
        assert!(is_school_day(0));
        assert!(is_school_day(4));
        assert!(!is_school_day(5));
        assert!(!is_school_day(6));
    }

    #[test]
    fn test_week_start() {
        assert_eq!(week_start(date(2024, 9, 1)), date(2024, 9, 1));
        assert_eq!(week_start(date(2024, 9, 4)), date(2024, 9, 1));
        assert_eq!(week_start(date(2024, 9, 7)), date(2024, 9, 1));
        assert_eq!(week_start(date(2024, 9, 8)), date(2024, 9, 8));
    }
}
