//! Table configuration

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::column::{Column, ColumnRegistry, DEFAULT_PLACEHOLDER};
use crate::error::{GridError, Result};
use crate::filter::FilterState;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::sort::SortState;
use crate::window::DEFAULT_OVERSCAN;

/// How row heights are obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowHeight {
    /// Every row has this height.
    Fixed(u32),
    /// Each record carries its own height in `field`; records without it
    /// use `default`.
    Variable { field: String, default: u32 },
}

impl Default for RowHeight {
    fn default() -> Self {
        RowHeight::Fixed(1)
    }
}

/// Where the loaded records come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// The loaded records are the whole dataset; the table paginates them.
    #[default]
    Client,
    /// The loaded records are one page; the caller supplies the total count.
    Server,
}

/// Configuration of a data table.
///
/// Loaded from JSON; every field is optional.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::TableConfig;
///
/// let config = TableConfig::from_json(r#"{
///     "columns": [{ "key": "name", "title": "Name", "sortable": true }],
///     "page_size": 50
/// }"#).unwrap();
///
/// assert_eq!(config.page_size, 50);
/// assert_eq!(config.row_key, "id");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Column definitions, in display order.
    pub columns: Vec<Column>,

    /// Records per page.
    ///
    /// Default: 20
    pub page_size: usize,

    /// Extra rows rendered on each side of the viewport.
    ///
    /// Default: 3
    pub overscan: usize,

    /// Row heights for windowing.
    ///
    /// Default: fixed 1
    pub row_height: RowHeight,

    /// Whether only the rows near the viewport are materialized.
    ///
    /// Default: true
    pub virtualized: bool,

    /// Whether rows can be selected.
    ///
    /// Default: true
    pub selectable: bool,

    /// Field path holding the row key.
    ///
    /// Default: `"id"`
    pub row_key: String,

    /// Client-side or server-side data.
    pub data_mode: DataMode,

    /// Quiet interval before typed search text is applied.
    ///
    /// Default: 300
    pub search_debounce_ms: u64,

    /// Base name of export files.
    ///
    /// Default: `"export"`
    pub export_file_name: String,

    /// Text shown for values that do not resolve.
    ///
    /// Default: `"-"`
    pub placeholder: String,

    /// Initial sort.
    pub sort: SortState,

    /// Initial filters.
    pub filter: FilterState,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            overscan: DEFAULT_OVERSCAN,
            row_height: RowHeight::default(),
            virtualized: true,
            selectable: true,
            row_key: "id".to_string(),
            data_mode: DataMode::Client,
            search_debounce_ms: 300,
            export_file_name: "export".to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            sort: SortState::none(),
            filter: FilterState::new(),
        }
    }
}

impl TableConfig {
    /// Creates a config with default values and the given columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Parses a JSON document and clamps invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the row height mode.
    pub fn with_row_height(mut self, row_height: RowHeight) -> Self {
        self.row_height = row_height;
        self
    }

    /// Sets the data mode.
    pub fn with_data_mode(mut self, data_mode: DataMode) -> Self {
        self.data_mode = data_mode;
        self
    }

    /// Sets the overscan.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Turns virtualization off.
    pub fn without_virtualization(mut self) -> Self {
        self.virtualized = false;
        self
    }

    /// Turns selection off.
    pub fn without_selection(mut self) -> Self {
        self.selectable = false;
        self
    }

    /// Clamps values that would break paging or windowing.
    pub fn normalized(mut self) -> Self {
        if self.page_size == 0 {
            log::warn!("page_size 0 is not allowed, using 1");
            self.page_size = 1;
        }
        match &mut self.row_height {
            RowHeight::Fixed(h) if *h == 0 => {
                log::warn!("row_height 0 is not allowed, using 1");
                *h = 1;
            }
            RowHeight::Variable { default, .. } if *default == 0 => {
                log::warn!("default row height 0 is not allowed, using 1");
                *default = 1;
            }
            _ => {}
        }
        self
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Builds the column registry described by this config.
    pub fn registry(&self) -> Result<ColumnRegistry> {
        if self.columns.is_empty() {
            return Err(GridError::config("no columns defined"));
        }
        Ok(ColumnRegistry::new(self.columns.clone())?.with_placeholder(self.placeholder.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = TableConfig::from_json("{}").unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.overscan, 3);
        assert_eq!(config.row_height, RowHeight::Fixed(1));
        assert!(config.virtualized);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.data_mode, DataMode::Client);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let config = TableConfig::from_json(r#"{"page_size": 0, "row_height": 0}"#).unwrap();
        assert_eq!(config.page_size, 1);
        assert_eq!(config.row_height, RowHeight::Fixed(1));
    }

    #[test]
    fn test_variable_heights_and_initial_state() {
        let config = TableConfig::from_json(
            r#"{
                "row_height": { "field": "lines", "default": 2 },
                "data_mode": "server",
                "sort": { "column_key": "score", "direction": "descending" },
                "filter": { "free_text": "ada", "per_column": { "status": ["active"] } }
            }"#,
        )
        .unwrap();
        assert!(matches!(config.row_height, RowHeight::Variable { ref field, default: 2 } if field == "lines"));
        assert_eq!(config.data_mode, DataMode::Server);
        assert_eq!(config.sort.direction, SortDirection::Descending);
        assert_eq!(config.filter.free_text, "ada");
    }

    #[test]
    fn test_registry_requires_columns() {
        assert!(matches!(TableConfig::default().registry(), Err(GridError::Config(_))));
    }
}
