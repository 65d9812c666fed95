//! Canonical storage casts.
//!
//! An attribute's storage cast is the first of its allowed types that has a
//! canonical storage kind. Each cast is a pure conversion: it rewrites a
//! value into the storage kind when that can be done without loss and
//! otherwise returns the value untouched.

use crate::PrimitiveType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The canonical storage kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageCast {
    String,
    Integer,
    Boolean,
    Array,
    Object,
    DateTime,
}

impl StorageCast {
    /// Maps a value kind to its storage cast, if it has one.
    pub const fn for_type(kind: &PrimitiveType) -> Option<Self> {
        match kind {
            PrimitiveType::String => Some(Self::String),
            PrimitiveType::Integer => Some(Self::Integer),
            PrimitiveType::Boolean => Some(Self::Boolean),
            PrimitiveType::Array => Some(Self::Array),
            PrimitiveType::Object => Some(Self::Object),
            PrimitiveType::DateTime => Some(Self::DateTime),
            PrimitiveType::Float
            | PrimitiveType::Null
            | PrimitiveType::Mixed
            | PrimitiveType::Other(_) => None,
        }
    }

    /// Picks the cast of the first kind in `kinds` that has one.
    pub fn first_supported<'a>(kinds: impl IntoIterator<Item = &'a PrimitiveType>) -> Option<Self> {
        kinds.into_iter().find_map(Self::for_type)
    }

    /// Converts `value` into this storage kind. Null is never converted.
    pub fn coerce(&self, value: &Value) -> Value {
        let converted = match (self, value) {
            (_, Value::Null) => None,
            (Self::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::Integer, Value::Number(n)) if n.is_f64() => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Value::from(f as i64)),
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (Self::Integer, Value::Bool(b)) => Some(Value::from(i64::from(*b))),
            (Self::Boolean, Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => None,
            },
            (Self::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            (Self::Array, Value::String(s)) => serde_json::from_str::<Value>(s)
                .ok()
                .filter(Value::is_array),
            (Self::Object, Value::String(s)) => serde_json::from_str::<Value>(s)
                .ok()
                .filter(Value::is_object),
            (Self::DateTime, Value::String(s)) => {
                parse_datetime(s).map(|dt| Value::String(format_datetime(&dt)))
            }
            (Self::DateTime, Value::Number(n)) => n
                .as_i64()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .map(|dt| Value::String(format_datetime(&dt))),
            _ => None,
        };
        converted.unwrap_or_else(|| value.clone())
    }
}

/// Parses the timestamp formats accepted for datetime attributes:
/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC) and `YYYY-MM-DD`.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats a timestamp the way datetime attributes are stored.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
