//! The value kinds an attribute can admit.

use crate::cast::parse_datetime;
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A value kind accepted by an attribute declaration.
///
/// Declarations name types as strings; [`FromStr`] folds the accepted aliases
/// (`int`, `bool`, `DateTime`, `f64`, ...) onto this enum. Names outside the
/// known set become [`PrimitiveType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    String,
    Integer,
    /// Any JSON number. Recognized but never used as a storage cast.
    Float,
    Boolean,
    Array,
    Object,
    /// A string holding a parseable timestamp.
    DateTime,
    /// The null marker.
    Null,
    /// Admits every value. Recognized but never used as a storage cast.
    Mixed,
    /// A host-defined type name the engine cannot inspect.
    ///
    /// It still counts as an allowed type: it matches any non-null value and
    /// never yields a storage cast, so `["string", "Money"]` casts to string.
    Other(String),
}

impl PrimitiveType {
    /// Returns true if `value` is of this kind at runtime.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::DateTime => value.as_str().is_some_and(|s| parse_datetime(s).is_some()),
            Self::Null => value.is_null(),
            Self::Mixed => true,
            Self::Other(_) => !value.is_null(),
        }
    }

    /// Names the runtime kind of a value, for diagnostics.
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_f64() => "float",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Returns the canonical name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::DateTime => "datetime",
            Self::Null => "null",
            Self::Mixed => "mixed",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim() {
            "string" | "str" | "String" => Self::String,
            "integer" | "int" | "i32" | "i64" | "u32" | "u64" => Self::Integer,
            "float" | "double" | "f32" | "f64" | "number" => Self::Float,
            "boolean" | "bool" => Self::Boolean,
            "array" | "list" | "Vec" => Self::Array,
            "object" | "map" => Self::Object,
            "datetime" | "DateTime" | "date_time" | "timestamp" | "Carbon\\Carbon" => Self::DateTime,
            "null" | "none" => Self::Null,
            "mixed" | "any" => Self::Mixed,
            "" => return Err(Error::UnknownType(s.to_string())),
            other => Self::Other(other.to_string()),
        };
        Ok(kind)
    }
}
