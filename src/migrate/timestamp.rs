use chrono::{DateTime, FixedOffset, NaiveDateTime};
use rusqlite::types::Value;

use crate::error::{Error, Result};
use crate::types::canonical_offset;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Normalizes a raw `created_at` column value from the legacy schema.
///
/// Timezone-aware text keeps its offset. Naive text is taken as wall-clock
/// time and stamped with the fixed +07:00 offset. Blobs are decoded as UTF-8
/// and then treated as text. Null stays null. Anything else is malformed;
/// callers are expected to log, store null, and keep going.
pub fn normalize_timestamp(value: &Value) -> Result<Option<DateTime<FixedOffset>>> {
    match value {
        Value::Null => Ok(None),
        Value::Text(s) => normalize_text(s).map(Some),
        Value::Blob(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => normalize_text(s).map(Some),
            Err(_) => Err(Error::MalformedTimestamp(format!(
                "{}-byte blob is not utf-8",
                bytes.len()
            ))),
        },
        Value::Integer(i) => Err(Error::MalformedTimestamp(i.to_string())),
        Value::Real(f) => Err(Error::MalformedTimestamp(f.to_string())),
    }
}

fn normalize_text(s: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    // ISO-8601 with an offset but a space separator.
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt);
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            if let Some(dt) = naive.and_local_timezone(canonical_offset()).single() {
                return Ok(dt);
            }
        }
    }

    Err(Error::MalformedTimestamp(s.to_string()))
}
