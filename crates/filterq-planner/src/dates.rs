//! ISO-8601 string → native date pass.
//!
//! Decoded filters carry dates as strings. This pass is opt-in: it walks any
//! value and replaces strings shaped like `YYYY-MM-DDT...` that also parse as
//! a date/time. Everything else, including existing dates, is untouched, so
//! running it twice is the same as running it once.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use filterq_core::value::Value;

static ISO_DATE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").expect("static ISO pattern"));

/// Zone-less spellings accepted after RFC 3339; read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub fn cast_iso_strings_to_dates(value: &Value) -> Value {
    match value {
        Value::Str(s) => match parse_iso_date_time(s) {
            Some(date) => Value::Date(date),
            None => value.clone(),
        },
        Value::List(items) => Value::List(items.iter().map(cast_iso_strings_to_dates).collect()),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), cast_iso_strings_to_dates(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Parse `s` when it matches the date-with-time shape.
pub fn parse_iso_date_time(s: &str) -> Option<DateTime<Utc>> {
    if !ISO_DATE_TIME.is_match(s) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
