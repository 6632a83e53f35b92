//! # Timestamps
//!
//! Documents store their timestamp as text in [`TIMESTAMP_FORMAT`]. Reading
//! is lenient: files edited by hand or written by older tools may carry ISO
//! `T` separators, offsets, or just a date. A value that matches none of the
//! accepted shapes yields `None` and the caller decides whether to skip it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format used when writing timestamps (`2024-01-05 09:30:00`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted naive date-time shapes, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Formats a timestamp for storage.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
///
/// ## Example
/// ```rust
/// use comanda_core::timestamp::parse_timestamp;
///
/// assert!(parse_timestamp("2024-01-05 09:30:00").is_some());
/// assert!(parse_timestamp("2024-01-05T09:30:00+01:00").is_some());
/// assert!(parse_timestamp("2024-01-05").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in NAIVE_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
            return Some(at);
        }
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.naive_local());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parses only the calendar date of a stored timestamp.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_timestamp(text).map(|at| at.date())
}
