//! Column definitions and the column registry.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::{GridError, Result};
use crate::model::{Record, Value};

/// Default text shown for values that do not resolve.
pub const DEFAULT_PLACEHOLDER: &str = "-";

/// Custom cell renderer. Returning `None` renders the placeholder.
pub type Renderer = Arc<dyn Fn(&Record) -> Option<String> + Send + Sync>;

/// Kind of filter control a column offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Text,
    Select,
    Date,
    Number,
}

/// A choice offered by a select filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: Value,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Column configuration.
///
/// Columns describe which record fields are shown, sorted and filtered.
/// Renderers are code-only and are skipped when a column is loaded from
/// configuration.
///
/// # Examples
///
/// ```
/// use datagrid_lib::column::{Column, FilterKind};
///
/// let columns = vec![
///     Column::new("name", "Name").width(30).sortable(),
///     Column::new("owner", "Owner").path("owner.name"),
///     Column::new("score", "Score").sortable().filterable(FilterKind::Number),
/// ];
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
    /// Unique identifier within a registry.
    pub key: String,
    /// Header text.
    pub title: String,
    /// Dot-separated accessor into a record. Empty means "same as key".
    pub field_path: String,
    /// Width in display cells.
    pub width: u16,
    /// Whether header clicks sort by this column.
    pub sortable: bool,
    /// Whether this column takes part in per-column filtering.
    pub filterable: bool,
    pub filter_kind: FilterKind,
    pub filter_options: Vec<FilterOption>,
    #[serde(skip)]
    pub renderer: Option<Renderer>,
}

impl Column {
    /// Create a new column reading the field named like its key.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            field_path: key.clone(),
            key,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Read the value from a different field path.
    pub fn path(mut self, field_path: impl Into<String>) -> Self {
        self.field_path = field_path.into();
        self
    }

    /// Set the column width.
    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Make the column filterable with the given filter kind.
    pub fn filterable(mut self, kind: FilterKind) -> Self {
        self.filterable = true;
        self.filter_kind = kind;
        self
    }

    /// Offer fixed choices (for select filters).
    pub fn options(mut self, options: Vec<FilterOption>) -> Self {
        self.filter_options = options;
        self
    }

    /// Render cells with a custom function.
    pub fn render(mut self, f: impl Fn(&Record) -> Option<String> + Send + Sync + 'static) -> Self {
        self.renderer = Some(Arc::new(f));
        self
    }

    /// Raw value of this column in a record.
    pub fn value<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        record.resolve(&self.field_path)
    }

    /// Rendered text of this column, or `None` if nothing resolves.
    pub fn text(&self, record: &Record) -> Option<String> {
        match &self.renderer {
            Some(render) => render(record),
            None => self.value(record).and_then(Value::display_text),
        }
    }
}

impl Default for Column {
    fn default() -> Self {
        Self {
            key: String::new(),
            title: String::new(),
            field_path: String::new(),
            width: 12,
            sortable: false,
            filterable: false,
            filter_kind: FilterKind::Text,
            filter_options: Vec::new(),
            renderer: None,
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("field_path", &self.field_path)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("filter_kind", &self.filter_kind)
            .field("filter_options", &self.filter_options)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

/// Ordered set of columns with unique keys and unique field paths.
#[derive(Debug, Clone)]
pub struct ColumnRegistry {
    columns: Vec<Column>,
    placeholder: String,
}

impl ColumnRegistry {
    /// Build a registry, validating keys and field paths.
    ///
    /// Empty field paths default to the column key. Two columns may not
    /// read the same field path, since exports key cells by path.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut paths = HashSet::new();
        let mut validated = Vec::with_capacity(columns.len());

        for mut column in columns {
            if column.key.trim().is_empty() {
                return Err(GridError::invalid_column(&column.title, "empty key"));
            }
            if !seen.insert(column.key.clone()) {
                return Err(GridError::DuplicateColumn { key: column.key });
            }
            if column.field_path.is_empty() {
                column.field_path = column.key.clone();
            }
            if !paths.insert(column.field_path.clone()) {
                return Err(GridError::invalid_column(
                    &column.key,
                    format!("duplicate field path '{}'", column.field_path),
                ));
            }
            validated.push(column);
        }

        Ok(Self {
            columns: validated,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        })
    }

    /// Use a different placeholder for unresolved values.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by key.
    pub fn get(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Position of a column by key.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    /// Whether the key names a registered, sortable column.
    pub fn is_sortable(&self, key: &str) -> bool {
        self.get(key).is_some_and(|c| c.sortable)
    }

    /// Cell text for display: rendered text or the placeholder.
    pub fn display(&self, column: &Column, record: &Record) -> String {
        column
            .text(record)
            .unwrap_or_else(|| self.placeholder.clone())
    }

    /// Column titles in order.
    pub fn titles(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.title.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a ColumnRegistry {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_rejected() {
        let result = ColumnRegistry::new(vec![Column::new("a", "A"), Column::new("a", "Again")]);
        assert!(matches!(result, Err(GridError::DuplicateColumn { key }) if key == "a"));
    }

    #[test]
    fn test_duplicate_field_path_rejected() {
        let result = ColumnRegistry::new(vec![
            Column::new("city", "City").path("address.city"),
            Column::new("town", "Town").path("address.city"),
        ]);
        assert!(matches!(result, Err(GridError::InvalidColumn { key, .. }) if key == "town"));

        let result = ColumnRegistry::new(vec![Column::new("name", "Name"), Column::new("label", "Label").path("name")]);
        assert!(matches!(result, Err(GridError::InvalidColumn { key, .. }) if key == "label"));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = ColumnRegistry::new(vec![Column::new(" ", "Blank")]);
        assert!(matches!(result, Err(GridError::InvalidColumn { .. })));
    }

    #[test]
    fn test_display_falls_back_to_placeholder() {
        let registry = ColumnRegistry::new(vec![Column::new("missing", "Missing")])
            .unwrap()
            .with_placeholder("n/a");
        let record = Record::new().set("other", 1i64);
        assert_eq!(registry.display(&registry.columns()[0], &record), "n/a");
    }

    #[test]
    fn test_renderer_overrides_value() {
        let column = Column::new("score", "Score")
            .render(|r| r.resolve("score").and_then(Value::as_f64).map(|s| format!("{s:.1} pts")));
        let record = Record::new().set("score", 3i64);
        assert_eq!(column.text(&record).as_deref(), Some("3.0 pts"));
    }

    #[test]
    fn test_deserialize_fills_field_path() {
        let columns: Vec<Column> = serde_json::from_str(
            r#"[{"key": "status", "title": "Status", "filterable": true, "filter_kind": "select"}]"#,
        )
        .unwrap();
        let registry = ColumnRegistry::new(columns).unwrap();
        let status = registry.get("status").unwrap();
        assert_eq!(status.field_path, "status");
        assert_eq!(status.filter_kind, FilterKind::Select);
    }
}
