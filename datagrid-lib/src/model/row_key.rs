//! Row identity.

use std::fmt;
use std::sync::Arc;

use super::Record;

/// Function deriving a row key from a record.
pub type KeyFn = Arc<dyn Fn(&Record) -> Option<String> + Send + Sync>;

/// How a record's stable identity is obtained.
///
/// The key must not change while the same underlying entity is displayed;
/// selection is tracked by it across filtering, sorting and paging.
#[derive(Clone)]
pub enum RowKey {
    /// Read the key from a field path.
    Field(String),
    /// Derive the key with a function.
    Derived(KeyFn),
}

impl RowKey {
    /// Key read from the given field path.
    pub fn field(path: impl Into<String>) -> Self {
        Self::Field(path.into())
    }

    /// Key derived by a function.
    pub fn derived(f: impl Fn(&Record) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Derived(Arc::new(f))
    }

    /// Returns the key of a record, or `None` if it cannot be derived.
    pub fn key_of(&self, record: &Record) -> Option<String> {
        match self {
            RowKey::Field(path) => record.text(path),
            RowKey::Derived(f) => f(record),
        }
    }

    /// Keys for a page of records.
    ///
    /// Records without a key get `#<position>` so the table keeps working;
    /// such keys are only stable while the page itself is unchanged.
    pub fn keys_for(&self, records: &[Record]) -> Vec<String> {
        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                self.key_of(record).unwrap_or_else(|| {
                    log::warn!("Record at position {} has no row key ({:?})", i, self);
                    format!("#{}", i)
                })
            })
            .collect()
    }
}

impl Default for RowKey {
    fn default() -> Self {
        RowKey::Field("id".to_string())
    }
}

impl fmt::Debug for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Field(path) => f.debug_tuple("Field").field(path).finish(),
            RowKey::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}
