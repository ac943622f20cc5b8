//! Check-in time extraction from the portal's results table.

use chrono::{DateTime, FixedOffset, Timelike};

use crate::models::WindowKind;

lazy_static::lazy_static! {
    static ref CLOCK_TIME_REGEX: regex::Regex =
        regex::Regex::new(r"\b([01]\d|2[0-3]):[0-5]\d:[0-5]\d\b").unwrap();
}

/// Returns the first `HH:MM:SS` occurrence in `text`.
pub fn extract_clock_time(text: &str) -> Option<String> {
    CLOCK_TIME_REGEX.find(text).map(|m| m.as_str().to_string())
}

/// Picks the cell for `window` from the first results row and extracts its time.
pub fn checkin_time_from_row(cells: &[String], window: WindowKind) -> Option<String> {
    cells
        .get(window.results_column())
        .and_then(|cell| extract_clock_time(cell))
}

/// Resolves the reported check-in time.
///
/// Uses the results-table cell for the window current at `now`; falls back to
/// `now` formatted as `HH:MM:SS` when the row is missing or holds no time.
pub fn resolve_checkin_time(first_row: Option<&[String]>, now: DateTime<FixedOffset>) -> String {
    let window = WindowKind::for_hour(now.hour());
    first_row
        .and_then(|cells| checkin_time_from_row(cells, window))
        .unwrap_or_else(|| now.format("%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<FixedOffset> {
        shared::calendar::local_offset()
            .with_ymd_and_hms(2026, 10, 19, hour, minute, second)
            .unwrap()
    }

    fn row() -> Vec<String> {
        vec![
            "19-10-2026".to_string(),
            "07:03:11 (WFO)".to_string(),
            "12:15:40".to_string(),
            "-".to_string(),
        ]
    }

    #[test]
    fn test_extract_clock_time() {
        assert_eq!(extract_clock_time("Jam 07:03:11 WIB"), Some("07:03:11".to_string()));
        assert_eq!(extract_clock_time("23:59:59"), Some("23:59:59".to_string()));
        assert_eq!(extract_clock_time("07:03"), None);
        assert_eq!(extract_clock_time("24:00:00"), None);
        assert_eq!(extract_clock_time(""), None);
    }

    #[test]
    fn test_row_column_follows_window() {
        let cells = row();
        assert_eq!(
            checkin_time_from_row(&cells, WindowKind::Pagi),
            Some("07:03:11".to_string())
        );
        assert_eq!(
            checkin_time_from_row(&cells, WindowKind::Siang),
            Some("12:15:40".to_string())
        );
        assert_eq!(checkin_time_from_row(&cells, WindowKind::Sore), None);
    }

    #[test]
    fn test_resolve_uses_table_cell() {
        let cells = row();
        assert_eq!(resolve_checkin_time(Some(&cells), at(7, 30, 0)), "07:03:11");
        assert_eq!(resolve_checkin_time(Some(&cells), at(12, 20, 0)), "12:15:40");
    }

    #[test]
    fn test_resolve_falls_back_to_now() {
        let cells = row();
        assert_eq!(resolve_checkin_time(Some(&cells), at(16, 5, 9)), "16:05:09");
        assert_eq!(resolve_checkin_time(None, at(7, 1, 2)), "07:01:02");
        let short = vec!["19-10-2026".to_string()];
        assert_eq!(resolve_checkin_time(Some(&short), at(7, 1, 2)), "07:01:02");
    }
}
