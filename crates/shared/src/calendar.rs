//! Working-day calendar in the fixed local timezone (WIB, UTC+07:00).

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc, Weekday};

/// Offset of the portal's local time from UTC, in seconds.
pub const LOCAL_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// National holidays and collective leave days (cuti bersama), as (year, month, day).
///
/// Hand-maintained; extend when the yearly government decree is published.
const HOLIDAYS: &[(i32, u32, u32)] = &[
    // 2025
    (2025, 1, 1),
    (2025, 1, 27),
    (2025, 1, 28),
    (2025, 1, 29),
    (2025, 3, 28),
    (2025, 3, 31),
    (2025, 4, 1),
    (2025, 4, 2),
    (2025, 4, 3),
    (2025, 4, 4),
    (2025, 4, 7),
    (2025, 4, 18),
    (2025, 5, 1),
    (2025, 5, 12),
    (2025, 5, 13),
    (2025, 5, 29),
    (2025, 5, 30),
    (2025, 6, 6),
    (2025, 6, 9),
    (2025, 6, 27),
    (2025, 8, 18),
    (2025, 9, 5),
    (2025, 12, 25),
    (2025, 12, 26),
    // 2026
    (2026, 1, 1),
    (2026, 1, 16),
    (2026, 2, 16),
    (2026, 2, 17),
    (2026, 3, 18),
    (2026, 3, 19),
    (2026, 3, 20),
    (2026, 3, 23),
    (2026, 3, 24),
    (2026, 4, 3),
    (2026, 5, 1),
    (2026, 5, 14),
    (2026, 5, 15),
    (2026, 5, 27),
    (2026, 5, 28),
    (2026, 6, 1),
    (2026, 6, 16),
    (2026, 8, 17),
    (2026, 8, 25),
    (2026, 12, 24),
    (2026, 12, 25),
];

/// Why a date is not a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonWorkingReason {
    Weekend(Weekday),
    Holiday,
}

impl std::fmt::Display for NonWorkingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonWorkingReason::Weekend(day) => write!(f, "weekend ({})", day),
            NonWorkingReason::Holiday => write!(f, "national holiday"),
        }
    }
}

/// The fixed local timezone offset.
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current date and time in the local timezone.
pub fn local_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&local_offset())
}

/// Returns true if the date is listed as a holiday.
pub fn is_holiday(date: NaiveDate) -> bool {
    HOLIDAYS.contains(&(date.year(), date.month(), date.day()))
}

/// Returns the reason the date is not a working day, or `None` if it is one.
pub fn non_working_reason(date: NaiveDate) -> Option<NonWorkingReason> {
    match date.weekday() {
        day @ (Weekday::Sat | Weekday::Sun) => Some(NonWorkingReason::Weekend(day)),
        _ if is_holiday(date) => Some(NonWorkingReason::Holiday),
        _ => None,
    }
}

/// Returns true if the date is neither a weekend nor a listed holiday.
pub fn is_working_day_on(date: NaiveDate) -> bool {
    non_working_reason(date).is_none()
}

/// Returns true if today (local time) is a working day.
pub fn is_working_day() -> bool {
    is_working_day_on(local_now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_every_listed_holiday_is_not_a_working_day() {
        for &(y, m, d) in HOLIDAYS {
            let day = date(y, m, d);
            assert!(!is_working_day_on(day), "{} should not be a working day", day);
        }
    }

    #[test]
    fn test_weekends_are_not_working_days() {
        // 2026-10-17 is a Saturday, 2026-10-18 a Sunday.
        assert_eq!(
            non_working_reason(date(2026, 10, 17)),
            Some(NonWorkingReason::Weekend(Weekday::Sat))
        );
        assert_eq!(
            non_working_reason(date(2026, 10, 18)),
            Some(NonWorkingReason::Weekend(Weekday::Sun))
        );
    }

    #[test]
    fn test_regular_weekdays_are_working_days() {
        let mut day = date(2026, 10, 19);
        for _ in 0..5 {
            assert!(is_working_day_on(day), "{} should be a working day", day);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_holiday_reason() {
        assert_eq!(
            non_working_reason(date(2026, 8, 17)),
            Some(NonWorkingReason::Holiday)
        );
        assert!(is_holiday(date(2025, 12, 25)));
        assert!(!is_holiday(date(2025, 12, 24)));
    }

    #[test]
    fn test_holiday_entries_are_valid_dates() {
        for &(y, m, d) in HOLIDAYS {
            assert!(NaiveDate::from_ymd_opt(y, m, d).is_some());
        }
    }

    #[test]
    fn test_local_now_uses_fixed_offset() {
        let utc_hour = Utc::now().hour();
        let now = local_now();
        assert_eq!(now.offset().local_minus_utc(), LOCAL_UTC_OFFSET_SECS);
        let expected = (utc_hour + 7) % 24;
        // Allow an hour tick between the two clock reads.
        assert!(now.hour() == expected || now.hour() == (expected + 1) % 24);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            NonWorkingReason::Weekend(Weekday::Sat).to_string(),
            "weekend (Sat)"
        );
        assert_eq!(NonWorkingReason::Holiday.to_string(), "national holiday");
    }
}
