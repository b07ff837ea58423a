//! Dynamic record

use indexmap::IndexMap;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// A dynamic record: field name to value, in insertion order.
///
/// Records are opaque to the table. Columns reach into them through a
/// dot-separated field path (`owner.name`), which walks nested record
/// values.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{Record, Value};
///
/// let owner = Record::new().set("name", "Ada");
/// let record = Record::new()
///     .set("id", "r1")
///     .set("owner", owner);
///
/// assert_eq!(record.resolve("owner.name"), Some(&Value::from("Ada")));
/// assert_eq!(record.resolve("owner.email"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    // =========================================================================
    // Path access
    // =========================================================================

    /// Resolves a dot-separated field path.
    ///
    /// Returns `None` when any segment is missing, when an intermediate
    /// value is not a record, or when the final value is null.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;

        for segment in segments {
            current = match current {
                Value::Record(nested) => nested.fields.get(segment)?,
                _ => return None,
            };
        }

        (!current.is_null()).then_some(current)
    }

    /// Sets a value at a dot-separated field path, creating nested records
    /// along the way. A non-record value in the way is replaced.
    pub fn set_path(&mut self, path: &str, value: Value) {
        match path.split_once('.') {
            None => {
                self.fields.insert(path.to_string(), value);
            }
            Some((head, rest)) => {
                let slot = self
                    .fields
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Record(Box::default()));
                if !matches!(slot, Value::Record(_)) {
                    *slot = Value::Record(Box::default());
                }
                if let Value::Record(nested) = slot {
                    nested.set_path(rest, value);
                }
            }
        }
    }

    /// Display text at a field path, or `None` if the path does not resolve.
    pub fn text(&self, path: &str) -> Option<String> {
        self.resolve(path).and_then(Value::display_text)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
