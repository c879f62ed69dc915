use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::errors::ParserError;

pub type Timestamp = DateTime<Utc>;

const EPOCH_MILLIS_KEY: &str = "$numberLong";

// `%#z` also takes `Z` and hour-only offsets such as `+05`.
static OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f %#z",
    "%Y-%m-%d %H:%M:%S%.f %#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y%m%dT%H%M%S%#z",
];

static ZONE_NAMES: &[&str] = &["UTC", "GMT"];

static NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %I:%M %p",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%B %d %Y %I:%M %p",
    "%a %b %e %H:%M:%S %Y",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

static DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%Y%m%d",
];

/// Normalizes a raw event timestamp.
///
/// Absent values, `null`, and shapes that carry no timestamp resolve to
/// `Ok(None)`. A millisecond epoch wrapper or a date string that cannot be
/// read is an error.
pub fn parse_timestamp(raw: Option<&Value>) -> Result<Option<Timestamp>, ParserError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(fields)) => match fields.get(EPOCH_MILLIS_KEY) {
            Some(millis) => parse_epoch_millis(millis).map(Some),
            None => Ok(None),
        },
        Some(Value::String(text)) => parse_timestamp_str(text).map(Some),
        Some(_) => Ok(None),
    }
}

pub fn parse_epoch_millis(value: &Value) -> Result<Timestamp, ParserError> {
    let millis = match value {
        Value::String(text) => text.trim().parse::<i64>().ok(),
        Value::Number(number) => number.as_i64(),
        _ => None,
    };

    millis
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| ParserError::InvalidEpoch {
            raw: value.to_string(),
        })
}

/// Permissive date/time parsing. Values with an offset are converted to UTC;
/// values without one are taken as UTC wall-clock time.
pub fn parse_timestamp_str(value: &str) -> Result<Timestamp, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ParserError::invalid_timestamp(
            value,
            "string does not contain a date",
        ));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let wall_clock = strip_zone_name(trimmed);

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(wall_clock, fmt) {
            return Ok(dt.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(wall_clock, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    Err(ParserError::invalid_timestamp(
        trimmed,
        "no supported date/time layout matched",
    ))
}

// A trailing `UTC`/`GMT` names the zone naive values are already read in.
fn strip_zone_name(value: &str) -> &str {
    ZONE_NAMES
        .iter()
        .find_map(|zone| value.strip_suffix(zone))
        .map(str::trim_end)
        .unwrap_or(value)
}
