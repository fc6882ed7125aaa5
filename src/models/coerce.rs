//! Lenient coercion of schema-loose document fields.
//!
//! Documents arrive from the store with optional, inconsistently typed
//! fields. Every coercion returns `Option` so a malformed field drops out
//! of an aggregate instead of failing the whole pass.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Numeric amount from a JSON number or numeric string.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-negative integer quantity from a JSON number or numeric string.
/// Fractional quantities truncate, whichever shape they arrive in;
/// negatives are unusable.
pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| truncate_quantity(n.as_f64()?)),
        Value::String(s) => truncate_quantity(s.trim().parse().ok()?),
        _ => None,
    }
}

fn truncate_quantity(f: f64) -> Option<u64> {
    (f >= 0.0).then_some(f as u64)
}

/// Point in time from any of the shapes the store has been seen to hold:
/// an RFC 3339 / ISO date string, a `{"seconds": i64}` timestamp object,
/// or an epoch-milliseconds number.
pub fn as_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_instant_str(s),
        Value::Object(map) => {
            let seconds = map.get("seconds").and_then(Value::as_i64)?;
            Utc.timestamp_opt(seconds, 0).single()
        }
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        _ => None,
    }
}

fn parse_instant_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt));
    }
    None
}
