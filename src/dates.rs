//! Date-likeness collaborator used by the equality and ordering comparators.
//!
//! A value is date-like when it is a BSON `DateTime` or a string that parses with one of
//! the configured formats. Formats are `chrono` strftime patterns; the `iso8601` token
//! accepts RFC 3339 plus the common ISO 8601 shapes without an offset.

use bson::Bson;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

/// Token accepted in a format list meaning "any ISO 8601 timestamp".
pub const ISO8601: &str = "iso8601";

const ISO_NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d"];

/// Default accepted formats, in the order they are tried.
pub const DEFAULT_DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%dT%H:%M:%S%:z",
    ISO8601,
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
];

/// Decides whether two raw values are both dates and, if so, how they order.
pub trait DateComparer: Send + Sync {
    /// `Some` only when both values are date-like.
    fn compare(&self, a: &Bson, b: &Bson) -> Option<Ordering>;
}

/// `chrono`-backed [`DateComparer`] over a configurable list of formats.
#[derive(Debug, Clone)]
pub struct DateParser {
    formats: Vec<String>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMATS.iter().map(|s| (*s).to_string()).collect())
    }
}

impl DateParser {
    #[must_use]
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    #[must_use]
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// Milliseconds since the epoch (UTC) when `val` is date-like.
    #[must_use]
    pub fn to_millis(&self, val: &Bson) -> Option<i64> {
        match val {
            Bson::DateTime(dt) => Some(dt.timestamp_millis()),
            Bson::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                self.formats.iter().find_map(|f| parse_with(s, f))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_date_like(&self, val: &Bson) -> bool {
        self.to_millis(val).is_some()
    }
}

impl DateComparer for DateParser {
    fn compare(&self, a: &Bson, b: &Bson) -> Option<Ordering> {
        let x = self.to_millis(a)?;
        let y = self.to_millis(b)?;
        Some(x.cmp(&y))
    }
}

fn parse_with(s: &str, format: &str) -> Option<i64> {
    if format == ISO8601 {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.timestamp_millis());
        }
        return ISO_NAIVE_FORMATS.iter().find_map(|f| parse_naive(s, f));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, format) {
        return Some(dt.timestamp_millis());
    }
    parse_naive(s, format)
}

// Naive values are read as UTC; date-only values land at midnight.
fn parse_naive(s: &str, format: &str) -> Option<i64> {
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
        return Some(ndt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(s, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc().timestamp_millis())
}
