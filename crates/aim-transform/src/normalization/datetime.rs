//! Calendar date parsing and ISO 8601 formatting.
//!
//! FAST UI submissions carry dates in several US and day-first layouts; the
//! pipeline stores them as ISO `YYYY-MM-DD` once recognized.

use chrono::{Datelike, NaiveDate};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted input layouts, tried in order. Month-first wins over day-first
/// whenever both would parse.
pub const DEFAULT_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%m/%d/%y", "%d/%m/%Y", "%d-%m-%Y",
];

/// Cheap shape test: `YYYY-MM-DD`, `MM/DD/YYYY`, `MM-DD-YYYY` or `M/D/YYYY`.
pub fn looks_like_date(value: &str) -> bool {
    let value = value.trim();
    if let Some(parts) = split3(value, '-') {
        let widths = (parts[0].len(), parts[1].len(), parts[2].len());
        return widths == (4, 2, 2) || widths == (2, 2, 4);
    }
    if let Some(parts) = split3(value, '/') {
        return (1..=2).contains(&parts[0].len())
            && (1..=2).contains(&parts[1].len())
            && parts[2].len() == 4;
    }
    false
}

fn split3(value: &str, separator: char) -> Option<[&str; 3]> {
    let mut parts = value.split(separator);
    let first = parts.next()?;
    let second = parts.next()?;
    let third = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let all_digits = [first, second, third]
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    all_digits.then_some([first, second, third])
}

/// Parses a date using [`DEFAULT_INPUT_FORMATS`].
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_date_with(value, DEFAULT_INPUT_FORMATS)
}

/// Parses a date trying each format in order.
pub fn parse_date_with<S: AsRef<str>>(value: &str, formats: &[S]) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format.as_ref()).ok())
}

/// Parses a strict ISO `YYYY-MM-DD` date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT).ok()
}

/// Returns the ISO form of a recognized date, `None` otherwise.
pub fn normalize_date(value: &str) -> Option<String> {
    parse_date(value).map(|date| date.format(ISO_DATE_FORMAT).to_string())
}

/// Completed years between `birth` and `as_of`. Negative when `birth` is in
/// the future.
pub fn age_on(birth: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut years = as_of.year() - birth.year();
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_detection() {
        assert!(looks_like_date("1980-01-15"));
        assert!(looks_like_date("01/15/1980"));
        assert!(looks_like_date("1/5/1980"));
        assert!(looks_like_date("01-15-1980"));
        assert!(!looks_like_date("1980/01/15"));
        assert!(!looks_like_date("-500"));
        assert!(!looks_like_date("2024-01"));
    }

    #[test]
    fn month_first_then_day_first() {
        assert_eq!(normalize_date("01/02/1980").as_deref(), Some("1980-01-02"));
        assert_eq!(normalize_date("25/12/1980").as_deref(), Some("1980-12-25"));
        assert_eq!(normalize_date("13/13/1980"), None);
    }

    #[test]
    fn age_respects_birthday() {
        let birth = NaiveDate::from_ymd_opt(1980, 6, 15).unwrap();
        let before = NaiveDate::from_ymd_opt(2020, 6, 14).unwrap();
        let on = NaiveDate::from_ymd_opt(2020, 6, 15).unwrap();
        assert_eq!(age_on(birth, before), 39);
        assert_eq!(age_on(birth, on), 40);
    }
}
