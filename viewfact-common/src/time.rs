//! Timestamp parsing and canonical formatting
//!
//! Raw session exports are loose about timestamp shape. Parsing accepts the
//! handful of layouts seen in practice and reports anything else as absent
//! rather than failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Canonical timestamp layout for cleaned output
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical date layout for cleaned output
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp leniently. Blank or unparseable input yields `None`.
///
/// RFC 3339 values with an offset are converted to UTC and the offset is
/// dropped; a bare date is taken as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse an optional raw field; absence and garbage are treated alike
pub fn parse_optional_timestamp(raw: Option<&str>) -> Option<NaiveDateTime> {
    raw.and_then(parse_timestamp)
}

/// Parse a date (or a timestamp, keeping only its date part)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|dt| dt.date())
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Signed elapsed minutes from `start` to `end`, with sub-minute precision
pub fn minutes_between(start: &NaiveDateTime, end: &NaiveDateTime) -> f64 {
    (*end - *start).num_milliseconds() as f64 / 60_000.0
}
