//! Filter engine: free-text search, per-column filters and quick filters.
//!
//! The three layers are ANDed together. Filtering is a pure function of
//! the records, the filter state and the column registry, so applying the
//! same state twice yields the same set.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::column::{Column, ColumnRegistry, FilterKind};
use crate::model::{Record, Value};

/// Value of a per-column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Membership test: the column value must equal one of these.
    Any(Vec<Value>),
    /// Case-insensitive substring match.
    Text(String),
}

impl FilterValue {
    /// An empty filter value is inactive.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Any(values) => values.is_empty(),
            FilterValue::Text(text) => text.trim().is_empty(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<Vec<Value>> for FilterValue {
    fn from(v: Vec<Value>) -> Self {
        FilterValue::Any(v)
    }
}

/// Complete filter state of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Free-text search term.
    pub free_text: String,
    /// Column key to filter value.
    pub per_column: BTreeMap<String, FilterValue>,
    /// Field key to required value (equality only).
    pub quick_filters: BTreeMap<String, Value>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text term (builder pattern).
    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = text.into();
        self
    }

    /// Set a per-column filter (builder pattern).
    pub fn with_column(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set_column(key, value);
        self
    }

    /// Set a quick filter (builder pattern).
    pub fn with_quick(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.quick_filters.insert(key.into(), value.into());
        self
    }

    /// Set or clear a per-column filter. Empty values remove the entry.
    pub fn set_column(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.per_column.remove(&key);
        } else {
            self.per_column.insert(key, value);
        }
    }

    /// True when no layer filters anything.
    pub fn is_empty(&self) -> bool {
        self.free_text.trim().is_empty()
            && self.per_column.values().all(FilterValue::is_empty)
            && self.quick_filters.is_empty()
    }

    /// Reset every layer.
    pub fn clear(&mut self) {
        self.free_text.clear();
        self.per_column.clear();
        self.quick_filters.clear();
    }
}

/// Filter state prepared for repeated matching (lowercased terms, resolved
/// columns).
struct Prepared<'a> {
    term: Option<String>,
    per_column: Vec<(&'a Column, &'a FilterValue, Option<String>)>,
    quick: &'a BTreeMap<String, Value>,
    columns: &'a ColumnRegistry,
}

impl<'a> Prepared<'a> {
    fn new(state: &'a FilterState, columns: &'a ColumnRegistry) -> Self {
        let term = state.free_text.trim();
        let per_column = state
            .per_column
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .filter_map(|(key, value)| match columns.get(key) {
                Some(column) => {
                    let needle = match value {
                        FilterValue::Text(text) => Some(text.trim().to_lowercase()),
                        FilterValue::Any(_) => None,
                    };
                    Some((column, value, needle))
                }
                None => {
                    log::debug!("Ignoring filter on unknown column '{}'", key);
                    None
                }
            })
            .collect();

        Self {
            term: (!term.is_empty()).then(|| term.to_lowercase()),
            per_column,
            quick: &state.quick_filters,
            columns,
        }
    }

    fn matches(&self, record: &Record) -> bool {
        self.matches_free_text(record) && self.matches_columns(record) && self.matches_quick(record)
    }

    fn matches_free_text(&self, record: &Record) -> bool {
        let Some(term) = &self.term else {
            return true;
        };
        self.columns.iter().any(|column| {
            column
                .text(record)
                .is_some_and(|text| text.to_lowercase().contains(term.as_str()))
        })
    }

    fn matches_columns(&self, record: &Record) -> bool {
        self.per_column.iter().all(|(column, value, needle)| {
            let Some(actual) = column.value(record) else {
                return false;
            };
            match value {
                FilterValue::Any(allowed) => match actual {
                    Value::List(items) => items
                        .iter()
                        .any(|item| allowed.iter().any(|a| a.loose_eq(item))),
                    _ => allowed.iter().any(|a| a.loose_eq(actual)),
                },
                FilterValue::Text(_) => {
                    let needle = needle.as_deref().unwrap_or_default();
                    text_matches(column.filter_kind, actual, needle)
                }
            }
        })
    }

    fn matches_quick(&self, record: &Record) -> bool {
        self.quick.iter().all(|(key, expected)| match record.resolve(key) {
            Some(actual) => actual.loose_eq(expected),
            None => expected.is_null(),
        })
    }
}

/// Scalar match for a text filter. Number columns compare numerically when
/// both sides are numbers; select columns match whole option values.
fn text_matches(kind: FilterKind, actual: &Value, needle: &str) -> bool {
    if kind == FilterKind::Number
        && let (Some(a), Ok(n)) = (actual.as_f64(), needle.parse::<f64>())
    {
        return a == n;
    }
    let Some(text) = actual.display_text() else {
        return false;
    };
    let text = text.to_lowercase();
    match kind {
        FilterKind::Select => text == needle,
        _ => text.contains(needle),
    }
}

/// Returns `true` if a single record passes every filter layer.
pub fn matches(record: &Record, state: &FilterState, columns: &ColumnRegistry) -> bool {
    Prepared::new(state, columns).matches(record)
}

/// Filters records, keeping input order.
pub fn apply<'a, I>(records: I, state: &FilterState, columns: &ColumnRegistry) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    if state.is_empty() {
        return records.into_iter().collect();
    }
    let prepared = Prepared::new(state, columns);
    records.into_iter().filter(|r| prepared.matches(r)).collect()
}

/// Indices of the records that pass, in input order.
pub fn filter_indices(records: &[Record], state: &FilterState, columns: &ColumnRegistry) -> Vec<usize> {
    if state.is_empty() {
        return (0..records.len()).collect();
    }
    let prepared = Prepared::new(state, columns);
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| prepared.matches(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnRegistry {
        ColumnRegistry::new(vec![
            Column::new("name", "Name"),
            Column::new("status", "Status").filterable(FilterKind::Select),
            Column::new("score", "Score").filterable(FilterKind::Number),
        ])
        .unwrap()
    }

    fn record(name: &str, status: &str, score: i64) -> Record {
        Record::new().set("name", name).set("status", status).set("score", score)
    }

    #[test]
    fn test_free_text_is_trimmed_and_case_insensitive() {
        let state = FilterState::new().with_free_text("  ADA ");
        assert!(matches(&record("Ada", "active", 1), &state, &columns()));
        assert!(!matches(&record("Bob", "active", 1), &state, &columns()));
    }

    #[test]
    fn test_select_matches_whole_value() {
        let state = FilterState::new().with_column("status", "active");
        assert!(matches(&record("Ada", "Active", 1), &state, &columns()));
        assert!(!matches(&record("Bob", "inactive", 1), &state, &columns()));
    }

    #[test]
    fn test_number_filter_compares_numerically() {
        let state = FilterState::new().with_column("score", "7.0");
        assert!(matches(&record("Ada", "active", 7), &state, &columns()));
        assert!(!matches(&record("Bob", "active", 70), &state, &columns()));
    }

    #[test]
    fn test_list_value_is_membership() {
        let state = FilterState::new().with_column("status", vec![Value::from("a"), Value::from("b")]);
        assert!(matches(&record("Ada", "b", 1), &state, &columns()));
        assert!(!matches(&record("Ada", "c", 1), &state, &columns()));
    }

    #[test]
    fn test_missing_value_never_matches_text() {
        let state = FilterState::new().with_column("name", "a");
        assert!(!matches(&Record::new().set("status", "active"), &state, &columns()));
    }

    #[test]
    fn test_quick_filter_equality() {
        let state = FilterState::new().with_quick("score", 1.0);
        assert!(matches(&record("Ada", "active", 1), &state, &columns()));
        assert!(!matches(&record("Ada", "active", 2), &state, &columns()));
    }

    #[test]
    fn test_unknown_column_is_ignored() {
        let state = FilterState::new().with_column("nope", "x");
        assert!(matches(&record("Ada", "active", 1), &state, &columns()));
    }
}
