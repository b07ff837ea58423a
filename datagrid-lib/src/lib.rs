//! Headless data table engine
//!
//! Windowed rendering, filtering, tri-state sorting, row selection,
//! pagination and export over record sets far larger than can be rendered
//! at once. The engine takes an already-fetched page of records and emits
//! requests for more; it never fetches data itself.

pub mod column;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod export;
pub mod filter;
pub mod model;
pub mod pagination;
pub mod pipeline;
pub mod request;
pub mod selection;
pub mod sort;
pub mod table;
pub mod window;

pub use error::GridError;
pub use table::DataTable;

/// Commonly used types.
pub mod prelude {
    pub use crate::column::{Column, ColumnRegistry, FilterKind, FilterOption};
    pub use crate::config::{DataMode, RowHeight, TableConfig};
    pub use crate::error::GridError;
    pub use crate::events::TableEvent;
    pub use crate::export::ExportFormat;
    pub use crate::filter::{FilterState, FilterValue};
    pub use crate::model::{Record, RowKey, Value};
    pub use crate::selection::HeaderCheck;
    pub use crate::sort::{SortDirection, SortState};
    pub use crate::table::{DataTable, RowView};
    pub use crate::window::WindowState;
}
