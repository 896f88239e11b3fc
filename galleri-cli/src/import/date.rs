//! Date normalization for spreadsheet values
//!
//! Spreadsheets carry dates as ISO strings, partial year-month strings,
//! locale-formatted strings, or raw day-count serials. Everything funnels
//! into a canonical `YYYY-MM-DD` string, or `None` when no usable date can
//! be recovered. Normalization never fails.

use calamine::Data;
use chrono::{DateTime, Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").unwrap());

/// Fallback string formats seen in hand-edited spreadsheets
const EXTRA_FORMATS: &[&str] = &["%Y/%m/%d", "%d/%m/%Y", "%d.%m.%Y"];

/// Normalize one raw cell into a `YYYY-MM-DD` string
pub fn normalize_date(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => normalize_date_str(s),
        Data::Int(i) => date_from_serial(*i as f64).map(format_date),
        Data::Float(f) => date_from_serial(*f).map(format_date),
        Data::DateTime(dt) => date_from_serial(dt.as_f64()).map(format_date),
        _ => None,
    }
}

/// Normalize a raw string into a `YYYY-MM-DD` string
pub fn normalize_date_str(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Full ISO dates pass through unchanged when they parse
    if ISO_DATE.is_match(trimmed) {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .map(|_| trimmed.to_string());
    }

    // Year-month only: synthesize the first of the month
    if YEAR_MONTH.is_match(trimmed) {
        let padded = format!("{}-01", trimmed);
        return NaiveDate::parse_from_str(&padded, "%Y-%m-%d")
            .ok()
            .map(|_| padded);
    }

    for format in EXTRA_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(format_date(date));
        }
    }

    // Last resort: a full timestamp, keep the calendar-date portion
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(format_date(dt.date_naive()));
    }

    None
}

/// Convert a spreadsheet day-count serial to a calendar date.
///
/// Serials count days from the day before spreadsheet day 1, so day 1 is
/// 1900-01-01. Results outside [1900, 2100] are rejected as corrupt input
/// (stray large numbers, negative offsets).
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.trunc() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 31)?;
    let date = epoch.checked_add_signed(Duration::days(days))?;
    if !(1900..=2100).contains(&date.year()) {
        return None;
    }
    Some(date)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_dates_pass_through_unchanged() {
        assert_eq!(
            normalize_date_str("2023-05-17"),
            Some("2023-05-17".to_string())
        );
        assert_eq!(
            normalize_date_str("  2001-01-31 "),
            Some("2001-01-31".to_string())
        );
    }

    #[test]
    fn test_invalid_iso_shaped_dates_are_rejected() {
        assert_eq!(normalize_date_str("2023-13-01"), None);
        assert_eq!(normalize_date_str("2023-02-30"), None);
    }

    #[test]
    fn test_year_month_gets_synthetic_day() {
        assert_eq!(normalize_date_str("2023-05"), Some("2023-05-01".to_string()));
        assert_eq!(normalize_date_str("2023-13"), None);
    }

    #[test]
    fn test_other_formats_are_converted() {
        assert_eq!(
            normalize_date_str("2023/05/17"),
            Some("2023-05-17".to_string())
        );
        assert_eq!(
            normalize_date_str("17.05.2023"),
            Some("2023-05-17".to_string())
        );
        assert_eq!(
            normalize_date_str("2023-05-17T09:30:00+02:00"),
            Some("2023-05-17".to_string())
        );
    }

    #[test]
    fn test_unparseable_strings_and_empty_input_are_no_date() {
        assert_eq!(normalize_date_str(""), None);
        assert_eq!(normalize_date_str("   "), None);
        assert_eq!(normalize_date_str("ring nästa vecka"), None);
        assert_eq!(normalize_date(&Data::Empty), None);
    }

    #[test]
    fn test_serial_day_one_is_nineteen_hundred() {
        assert_eq!(
            date_from_serial(1.0),
            NaiveDate::from_ymd_opt(1900, 1, 1)
        );
        assert_eq!(
            date_from_serial(32.0),
            NaiveDate::from_ymd_opt(1900, 2, 1)
        );
    }

    #[test]
    fn test_serial_time_fraction_is_dropped() {
        assert_eq!(
            date_from_serial(32.75),
            NaiveDate::from_ymd_opt(1900, 2, 1)
        );
    }

    #[test]
    fn test_serials_outside_sanity_bounds_are_rejected() {
        // Day 0 lands in 1899
        assert_eq!(date_from_serial(0.0), None);
        assert_eq!(date_from_serial(-5.0), None);
        // Far future: spreadsheet corruption, not a date
        assert_eq!(date_from_serial(200_000.0), None);
        assert_eq!(normalize_date(&Data::Float(200_000.0)), None);
        assert_eq!(normalize_date(&Data::Int(-1)), None);
    }

    #[test]
    fn test_numeric_cells_use_the_serial_path() {
        assert_eq!(normalize_date(&Data::Int(1)), Some("1900-01-01".to_string()));
        assert_eq!(
            normalize_date(&Data::Float(32.0)),
            Some("1900-02-01".to_string())
        );
    }
}
