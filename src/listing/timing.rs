use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ListingError;

/// Canonical stored form. Lexical order of this format is chronological order.
pub const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: [&str; 4] = [
    STORED_FORMAT,
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    Past,
    Upcoming,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayStyle {
    Full,
    Medium,
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ListingError> {
    let trimmed = value.trim();
    for fmt in NAIVE_FORMATS.iter() {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    // Offsets are dropped; only the wall-clock part is compared.
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_local())
        .map_err(|_| ListingError::Parse {
            value: value.to_string(),
        })
}

pub fn normalize_timestamp(value: &str) -> Result<String, ListingError> {
    parse_timestamp(value).map(|dt| dt.format(STORED_FORMAT).to_string())
}

/// Upcoming only when the show starts strictly after `now`.
pub fn classify(show_start: &str, now: NaiveDateTime) -> Result<Timing, ListingError> {
    let start = parse_timestamp(show_start)?;
    Ok(if start > now {
        Timing::Upcoming
    } else {
        Timing::Past
    })
}

pub fn format_datetime(value: &str, style: DisplayStyle) -> Result<String, ListingError> {
    let parsed = parse_timestamp(value)?;
    let pattern = match style {
        DisplayStyle::Full => "%A %B, %-d, %Y at %-I:%M%p",
        DisplayStyle::Medium => "%a %m, %d, %Y %-I:%M%p",
    };
    Ok(parsed.format(pattern).to_string())
}
