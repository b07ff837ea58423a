//! Sort engine: tri-state, single-column, stable ordering.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::column::ColumnRegistry;
use crate::model::{Record, Value};

/// Direction of the active sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
    #[default]
    None,
}

impl SortDirection {
    /// Next direction in the header-click cycle.
    pub fn cycle(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::None,
        }
    }
}

/// Current sort of a table. At most one column is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortState {
    pub column_key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// No sort.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            column_key: Some(key.into()),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            column_key: Some(key.into()),
            direction: SortDirection::Descending,
        }
    }

    /// Whether a column is actively sorted.
    pub fn is_active(&self) -> bool {
        self.column_key.is_some() && self.direction != SortDirection::None
    }

    /// Direction shown on the header of the given column.
    pub fn direction_for(&self, key: &str) -> SortDirection {
        match &self.column_key {
            Some(active) if active == key => self.direction,
            _ => SortDirection::None,
        }
    }

    /// State after a header click on `key`.
    ///
    /// The same column cycles `none → ascending → descending → none`;
    /// a different column starts at ascending.
    pub fn clicked(&self, key: &str) -> SortState {
        let next = self.direction_for(key).cycle();
        if next == SortDirection::None {
            SortState::none()
        } else {
            SortState {
                column_key: Some(key.to_string()),
                direction: next,
            }
        }
    }
}

/// Whether a value sorts after every regular value, in both directions.
fn trailing(value: Option<&Value>, dominant: Option<u8>) -> bool {
    match value {
        None => true,
        Some(v) => dominant.is_some_and(|rank| v.kind_rank() != rank),
    }
}

/// Most common value group in a column. Ties go to the lower group.
fn dominant_rank<'a>(values: impl Iterator<Item = Option<&'a Value>>) -> Option<u8> {
    let mut counts: HashMap<u8, usize> = HashMap::new();
    for value in values.flatten() {
        *counts.entry(value.kind_rank()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(ra, ca), (rb, cb)| ca.cmp(cb).then_with(|| rb.cmp(ra)))
        .map(|(rank, _)| rank)
}

/// Compares two column values under a direction.
///
/// Missing values and values of a different kind than the column's
/// dominant kind sort last in both directions.
fn compare(a: Option<&Value>, b: Option<&Value>, dominant: Option<u8>, direction: SortDirection) -> Ordering {
    let (ta, tb) = (trailing(a, dominant), trailing(b, dominant));
    if ta != tb {
        return ta.cmp(&tb);
    }
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.compare(b);
            match direction {
                SortDirection::Descending if !ta => ord.reverse(),
                _ => ord,
            }
        }
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

/// Sorts record indices in place. `None` direction leaves them untouched.
pub fn sort_indices(records: &[Record], indices: &mut [usize], state: &SortState, columns: &ColumnRegistry) {
    let Some(column) = state
        .column_key
        .as_deref()
        .filter(|_| state.direction != SortDirection::None)
        .and_then(|key| columns.get(key))
    else {
        return;
    };

    let values: Vec<Option<&Value>> = indices.iter().map(|&i| column.value(&records[i])).collect();
    let dominant = dominant_rank(values.iter().copied());

    let mut order: Vec<usize> = (0..indices.len()).collect();
    order.sort_by(|&x, &y| compare(values[x], values[y], dominant, state.direction));

    let sorted: Vec<usize> = order.into_iter().map(|pos| indices[pos]).collect();
    indices.copy_from_slice(&sorted);
}

/// Sorts records by the active column (stable).
pub fn apply<'a>(records: Vec<&'a Record>, state: &SortState, columns: &ColumnRegistry) -> Vec<&'a Record> {
    let Some(column) = state
        .column_key
        .as_deref()
        .filter(|_| state.direction != SortDirection::None)
        .and_then(|key| columns.get(key))
    else {
        return records;
    };

    let dominant = dominant_rank(records.iter().map(|r| column.value(r)));
    let mut records = records;
    records.sort_by(|a, b| compare(column.value(a), column.value(b), dominant, state.direction));
    records
}
