//! Selection state management.
//!
//! Selection uses row keys for stability across filtering, sorting and
//! paging. Keys are kept in insertion order so listeners always see the
//! selection in the order the user built it.

use std::collections::HashSet;

use indexmap::IndexSet;

/// Checkbox state of a "select all" header for a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderCheck {
    /// No row of the set is selected.
    #[default]
    None,
    /// Some but not all rows are selected.
    Some,
    /// Every row of the set is selected.
    All,
}

/// Key-based selection state.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Currently selected keys, in insertion order.
    selected: IndexSet<String>,
    /// Disabled selections ignore every change.
    enabled: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    /// Create a new empty, enabled selection.
    pub fn new() -> Self {
        Self {
            selected: IndexSet::new(),
            enabled: true,
        }
    }

    /// Create a selection that ignores all changes.
    pub fn disabled() -> Self {
        Self {
            selected: IndexSet::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get all selected keys in insertion order.
    pub fn selected(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    /// Check if a key is selected.
    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    /// Get the number of selected keys.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Add or remove a single key.
    /// Returns true if the selection changed.
    pub fn select(&mut self, key: &str, included: bool) -> bool {
        if !self.enabled {
            return false;
        }
        if included {
            self.selected.insert(key.to_string())
        } else {
            self.selected.shift_remove(key)
        }
    }

    /// Flip a single key.
    /// Returns true if the selection changed.
    pub fn toggle(&mut self, key: &str) -> bool {
        let included = !self.is_selected(key);
        self.select(key, included)
    }

    /// Add or remove exactly the given keys, leaving every other key as it
    /// was. Returns true if the selection changed.
    pub fn select_all<I, S>(&mut self, keys: I, included: bool) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for key in keys {
            changed |= self.select(key.as_ref(), included);
        }
        changed
    }

    /// Clear all selection.
    /// Returns the keys that were deselected.
    pub fn clear(&mut self) -> Vec<String> {
        self.selected.drain(..).collect()
    }

    /// Selected keys that are also in `known`, in insertion order.
    pub fn selected_among(&self, known: &HashSet<&str>) -> Vec<String> {
        self.selected
            .iter()
            .filter(|key| known.contains(key.as_str()))
            .cloned()
            .collect()
    }

    /// Header checkbox state for the given rows.
    pub fn header_check<S: AsRef<str>>(&self, keys: &[S]) -> HeaderCheck {
        let count = keys.iter().filter(|k| self.is_selected(k.as_ref())).count();
        match count {
            0 => HeaderCheck::None,
            n if n == keys.len() => HeaderCheck::All,
            _ => HeaderCheck::Some,
        }
    }
}
