//! Value enum for dynamic field values

use std::cmp::Ordering;

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::Record;

/// A dynamic value held by a record field.
///
/// Values deserialize from plain JSON without tags, so a record page fetched
/// by the caller can be handed to the table as-is.
///
/// # Type Mapping
///
/// | JSON | Rust Variant |
/// |------|--------------|
/// | null | `Null` |
/// | true/false | `Bool` |
/// | integer | `Int` |
/// | number | `Float` |
/// | string | `String` |
/// | array | `List` |
/// | object | `Record` |
///
/// `DateTime` is never produced by deserialization. It is built from
/// `chrono` values and serializes as an RFC 3339 string.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Value;
///
/// let name = Value::from("Contoso");
/// let score = Value::from(42i64);
/// assert_eq!(name.display_text().as_deref(), Some("Contoso"));
/// assert_eq!(score.display_text().as_deref(), Some("42"));
/// assert_eq!(Value::Null.display_text(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value. Must precede `DateTime` so untagged deserialization
    /// keeps timestamp strings verbatim.
    String(String),
    /// Date and time in UTC.
    DateTime(DateTime<Utc>),
    /// List of values (tags, multi-select fields).
    List(Vec<Value>),
    /// Nested record.
    Record(Box<Record>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::DateTime(_) => "datetime",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value for `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean if this is a bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text shown for this value in a cell, or `None` for null.
    pub fn display_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::DateTime(dt) => Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::String(s) => Some(s.clone()),
            Value::List(items) => Some(
                items
                    .iter()
                    .filter_map(Value::display_text)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Record(record) => serde_json::to_string(record).ok(),
        }
    }

    /// Equality used by quick filters and membership tests.
    ///
    /// Numbers compare by value, so `Int(1)` equals `Float(1.0)`.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// Ordering group of this value. Values of different groups are not
    /// compared by content.
    pub(crate) fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::DateTime(_) => 3,
            Value::String(_) => 4,
            Value::List(_) => 5,
            Value::Record(_) => 6,
        }
    }

    /// Compares two values of the same group.
    ///
    /// Strings compare case-insensitively first, then by exact bytes so the
    /// order stays total. Values of different groups order by group.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    let ord = x.compare(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.kind_rank().cmp(&other.kind_rank()),
            },
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(Box::new(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_plain_json() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "2024-05-01T10:00:00Z", "hi", [1, "a"]]"#)
                .unwrap();

        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Bool(true));
        assert_eq!(values[2], Value::Int(3));
        assert_eq!(values[3], Value::Float(2.5));
        assert_eq!(values[4], Value::from("2024-05-01T10:00:00Z"));
        assert_eq!(values[5], Value::from("hi"));
        assert_eq!(values[6], Value::List(vec![Value::Int(1), Value::from("a")]));
    }

    #[test]
    fn test_deserialize_object_as_record() {
        let value: Value = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        let Value::Record(record) = value else {
            panic!("expected record");
        };
        assert_eq!(record.get("name"), Some(&Value::from("Ada")));
    }

    #[test]
    fn test_loose_eq_numbers() {
        assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
        assert!(!Value::Int(1).loose_eq(&Value::from("1")));
    }

    #[test]
    fn test_compare_strings_case_insensitive() {
        assert_eq!(Value::from("apple").compare(&Value::from("Banana")), Ordering::Less);
        assert_eq!(Value::from("b").compare(&Value::from("B")), Ordering::Greater);
    }

    #[test]
    fn test_display_list_skips_nulls() {
        let list = Value::List(vec![Value::from("a"), Value::Null, Value::Int(2)]);
        assert_eq!(list.display_text().as_deref(), Some("a, 2"));
    }

    #[test]
    fn test_offset_timestamp_stays_verbatim() {
        let value: Value = serde_json::from_str(r#""2024-05-01T10:00:00+02:00""#).unwrap();
        assert_eq!(value, Value::from("2024-05-01T10:00:00+02:00"));
        assert_eq!(value.display_text().as_deref(), Some("2024-05-01T10:00:00+02:00"));
    }

    #[test]
    fn test_compare_nan_is_total() {
        let nan = Value::Float(f64::NAN);
        let one = Value::Float(1.0);
        assert_eq!(nan.compare(&nan), Ordering::Equal);
        assert_eq!(one.compare(&nan), nan.compare(&one).reverse());
        assert_ne!(one.compare(&nan), Ordering::Equal);
    }
}
