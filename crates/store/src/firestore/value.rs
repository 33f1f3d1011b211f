//! Wire representation of document field values.
//!
//! The document database encodes every field as a single-key object naming
//! its type (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...). This
//! module models that encoding as a tagged enum plus typed accessors, so the
//! repository layer never touches raw JSON.
//!
//! 64-bit integers are string-encoded on the wire; [`Value::integer`] and
//! [`Value::as_i64`] hide that.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single document field value in wire encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "nullValue")]
    Null(()),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    /// Int64, string-encoded on the wire.
    #[serde(rename = "integerValue")]
    Integer(String),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "timestampValue")]
    Timestamp(DateTime<Utc>),
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
    #[serde(rename = "mapValue")]
    Map(MapValue),
}

/// Wire wrapper for array values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

/// Wire wrapper for map values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Value {
    /// A null value.
    #[must_use]
    pub const fn null() -> Self {
        Self::Null(())
    }

    /// A string value.
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// An integer value (string-encoded on the wire).
    #[must_use]
    pub fn integer(n: i64) -> Self {
        Self::Integer(n.to_string())
    }

    /// A boolean value.
    #[must_use]
    pub const fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// A timestamp value.
    #[must_use]
    pub const fn timestamp(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }

    /// An array of string values.
    #[must_use]
    pub fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Array(ArrayValue {
            values: items.into_iter().map(Self::string).collect(),
        })
    }

    /// The value as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an i64, if it is a (string-encoded) integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The value as a bool, if it is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a timestamp, if it is one.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// The value as a list of strings, if it is an array of strings.
    ///
    /// Non-string array elements are skipped.
    #[must_use]
    pub fn as_string_array(&self) -> Option<Vec<String>> {
        match self {
            Self::Array(arr) => Some(
                arr.values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Whether this value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null(()))
    }
}

/// Convenience alias for a document's field map.
pub type Fields = BTreeMap<String, Value>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_string_value_wire_format() {
        let json = serde_json::to_string(&Value::string("hi")).unwrap();
        assert_eq!(json, r#"{"stringValue":"hi"}"#);
    }

    #[test]
    fn test_integer_value_is_string_encoded() {
        let json = serde_json::to_string(&Value::integer(42)).unwrap();
        assert_eq!(json, r#"{"integerValue":"42"}"#);

        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_i64(), Some(42));
    }

    #[test]
    fn test_null_value_wire_format() {
        let json = serde_json::to_string(&Value::null()).unwrap();
        assert_eq!(json, r#"{"nullValue":null}"#);
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_string(&Value::timestamp(ts)).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_timestamp(), Some(ts));
    }

    #[test]
    fn test_string_array_accessor() {
        let v = Value::string_array(["rust", "axum"]);
        assert_eq!(
            v.as_string_array(),
            Some(vec!["rust".to_owned(), "axum".to_owned()])
        );
    }

    #[test]
    fn test_array_value_wire_format() {
        let json = serde_json::to_string(&Value::string_array(["a"])).unwrap();
        assert_eq!(json, r#"{"arrayValue":{"values":[{"stringValue":"a"}]}}"#);
    }

    #[test]
    fn test_wrong_type_accessors_return_none() {
        let v = Value::string("x");
        assert_eq!(v.as_i64(), None);
        assert_eq!(v.as_bool(), None);
        assert_eq!(v.as_timestamp(), None);
    }
}
