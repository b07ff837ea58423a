//! The data table: owner of records, state and derived views.
//!
//! A table holds one record page plus the filter, sort, pagination,
//! selection and scroll state. Every mutation updates the derived views
//! synchronously and announces itself to the registered listeners.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use crate::column::ColumnRegistry;
use crate::config::{DataMode, RowHeight, TableConfig};
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::events::{Listeners, TableEvent};
use crate::export::{self, ExportFormat};
use crate::filter::{FilterState, FilterValue};
use crate::model::{Record, RowKey, Value};
use crate::pagination::Pagination;
use crate::pipeline::{Pipeline, PipelineStats};
use crate::request::RequestId;
use crate::request::RequestTracker;
use crate::selection::{HeaderCheck, Selection};
use crate::sort::SortState;
use crate::window::{Window, WindowState, Windower};

/// A materialized row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView<'a> {
    /// Position within the current page.
    pub position: usize,
    pub key: &'a str,
    pub record: &'a Record,
    /// Display text per column, placeholder for unresolved values.
    pub cells: Vec<String>,
    pub selected: bool,
    /// Vertical offset of the row.
    pub top: u64,
    pub height: u32,
}

/// Headless data table.
///
/// # Example
///
/// ```
/// use datagrid_lib::prelude::*;
///
/// let columns = ColumnRegistry::new(vec![
///     Column::new("name", "Name").sortable(),
///     Column::new("status", "Status").filterable(FilterKind::Select),
/// ]).unwrap();
///
/// let mut table = DataTable::new(columns, TableConfig::default());
/// table.set_records(vec![
///     Record::new().set("id", "1").set("name", "Ada").set("status", "active"),
///     Record::new().set("id", "2").set("name", "Bob").set("status", "inactive"),
/// ], None);
///
/// table.set_column_filter("status", "active");
/// assert_eq!(table.processed_len(), 1);
/// ```
#[derive(Debug)]
pub struct DataTable {
    columns: ColumnRegistry,
    config: TableConfig,
    row_key: RowKey,

    records: Arc<Vec<Record>>,
    keys: Vec<String>,
    total_count: usize,

    filter: FilterState,
    sort: SortState,
    pagination: Pagination,
    selection: Selection,
    windower: Windower,

    pipeline: Pipeline,
    processed: Arc<[usize]>,
    page: Range<usize>,

    search: Debouncer<String>,
    requests: RequestTracker,
    listeners: Listeners,
}

impl DataTable {
    /// Create a table over a column registry. The initial sort and filter
    /// come from the config.
    pub fn new(columns: ColumnRegistry, config: TableConfig) -> Self {
        let config = config.normalized();
        let selection = if config.selectable {
            Selection::new()
        } else {
            Selection::disabled()
        };

        let mut table = Self {
            row_key: RowKey::field(config.row_key.clone()),
            records: Arc::new(Vec::new()),
            keys: Vec::new(),
            total_count: 0,
            filter: config.filter.clone(),
            sort: config.sort.clone(),
            pagination: Pagination::new(config.page_size, 0),
            selection,
            windower: Windower::fixed(1, 0).with_overscan(config.overscan),
            pipeline: Pipeline::new(),
            processed: Arc::from(Vec::new()),
            page: 0..0,
            search: Debouncer::new(config.search_debounce()),
            requests: RequestTracker::new(),
            listeners: Listeners::new(),
            columns,
            config,
        };
        table.update_view();
        table
    }

    /// Create a table whose columns are described by the config.
    pub fn from_config(config: TableConfig) -> Result<Self> {
        let columns = config.registry()?;
        Ok(Self::new(columns, config))
    }

    /// Derive row keys differently (builder pattern).
    pub fn with_row_key(mut self, row_key: RowKey) -> Self {
        self.row_key = row_key;
        self.keys = self.row_key.keys_for(&self.records);
        self
    }

    /// Registered event listeners.
    pub fn listeners(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replace the loaded records.
    ///
    /// In client mode the records are the whole dataset and `total_count`
    /// is ignored. In server mode they are one page of `total_count`
    /// records (defaulting to the page length).
    pub fn set_records(&mut self, records: Vec<Record>, total_count: Option<usize>) {
        self.keys = self.row_key.keys_for(&records);
        self.total_count = total_count.unwrap_or(records.len());
        self.records = Arc::new(records);
        log::debug!("Loaded {} records (total {})", self.records.len(), self.total_count);
        self.update_view();
    }

    /// Accept a page answering a request. Pages for anything but the
    /// latest request are dropped; returns whether the page was applied.
    pub fn receive_page(&mut self, ticket: RequestId, records: Vec<Record>, total_count: Option<usize>) -> bool {
        if !self.requests.accept(ticket) {
            return false;
        }
        self.set_records(records, total_count);
        true
    }

    /// Whether the latest request is still unanswered.
    pub fn is_loading(&self) -> bool {
        self.requests.is_pending()
    }

    /// Issue a ticket for a state change. Client mode already holds the
    /// whole dataset, so its tickets are answered on the spot.
    fn issue_request(&mut self) -> RequestId {
        let ticket = self.requests.issue();
        if self.config.data_mode == DataMode::Client {
            self.requests.accept(ticket);
        }
        ticket
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    fn update_view(&mut self) {
        self.processed = self
            .pipeline
            .run(&self.records, &self.filter, &self.sort, &self.columns);

        self.page = match self.config.data_mode {
            DataMode::Client => {
                self.pagination.set_total_count(self.processed.len());
                self.pagination.slice().range()
            }
            DataMode::Server => {
                self.pagination.set_total_count(self.total_count);
                0..self.processed.len()
            }
        };

        match &self.config.row_height {
            RowHeight::Fixed(height) => self.windower.set_fixed(*height, self.page.len()),
            RowHeight::Variable { field, default } => {
                let heights: Vec<u32> = self.processed[self.page.clone()]
                    .iter()
                    .map(|&i| {
                        self.records[i]
                            .resolve(field)
                            .and_then(Value::as_f64)
                            .filter(|h| *h >= 1.0)
                            .map_or(*default, |h| h as u32)
                    })
                    .collect();
                self.windower.set_heights(&heights);
            }
        }
    }

    /// Number of records that pass the filters.
    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    /// Filtered and sorted records.
    pub fn processed_records(&self) -> Vec<&Record> {
        self.processed.iter().map(|&i| &self.records[i]).collect()
    }

    /// Row keys of the processed set, in processed order.
    pub fn processed_keys(&self) -> Vec<&str> {
        self.processed.iter().map(|&i| self.keys[i].as_str()).collect()
    }

    fn page_indices(&self) -> &[usize] {
        &self.processed[self.page.clone()]
    }

    /// Records on the current page.
    pub fn page_records(&self) -> Vec<&Record> {
        self.page_indices().iter().map(|&i| &self.records[i]).collect()
    }

    /// Row keys on the current page.
    pub fn page_keys(&self) -> Vec<&str> {
        self.page_indices().iter().map(|&i| self.keys[i].as_str()).collect()
    }

    /// Current window over the page rows. Without virtualization the whole
    /// page is materialized.
    pub fn window(&self) -> WindowState {
        if self.config.virtualized {
            return self.windower.window().clone();
        }
        let n = self.page.len();
        if n == 0 {
            return WindowState::Empty;
        }
        WindowState::Rows(Window {
            visible: 0..n,
            rendered: 0..n,
            rendered_top: 0,
            total_height: self.windower.total_height(),
        })
    }

    /// Rows to materialize, with their cells and selection state.
    pub fn rendered_rows(&self) -> Vec<RowView<'_>> {
        let page = self.page_indices();
        self.window()
            .rendered()
            .map(|position| {
                let i = page[position];
                let record = &self.records[i];
                let key = self.keys[i].as_str();
                RowView {
                    position,
                    key,
                    record,
                    cells: self.columns.iter().map(|c| self.columns.display(c, record)).collect(),
                    selected: self.selection.is_selected(key),
                    top: self.windower.offset_of(position),
                    height: self.windower.height_of(position),
                }
            })
            .collect()
    }

    pub fn pipeline_stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }

    // =========================================================================
    // Search and filters
    // =========================================================================

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Record a keystroke in the search box. The term is applied once no
    /// further keystroke arrives for the debounce interval.
    pub fn type_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search.push(text.into(), now);
    }

    /// Apply a debounced search term if its interval has passed.
    /// Returns true if the filter changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(term) => self.apply_free_text(term),
            None => false,
        }
    }

    /// Apply a pending search term immediately.
    pub fn flush_search(&mut self) -> bool {
        match self.search.flush() {
            Some(term) => self.apply_free_text(term),
            None => false,
        }
    }

    /// Set the free-text term now, dropping any pending keystrokes.
    pub fn set_free_text(&mut self, text: impl Into<String>) -> bool {
        self.search.cancel();
        self.apply_free_text(text.into())
    }

    fn apply_free_text(&mut self, text: String) -> bool {
        self.change_filter(|f| f.free_text = text)
    }

    /// Set a per-column filter. An empty value clears it.
    pub fn set_column_filter(&mut self, key: &str, value: impl Into<FilterValue>) -> bool {
        let value = value.into();
        self.change_filter(|f| f.set_column(key, value))
    }

    pub fn clear_column_filter(&mut self, key: &str) -> bool {
        self.change_filter(|f| {
            f.per_column.remove(key);
        })
    }

    /// Require a field to equal a value.
    pub fn set_quick_filter(&mut self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        self.change_filter(|f| {
            f.quick_filters.insert(key.to_string(), value);
        })
    }

    pub fn clear_quick_filter(&mut self, key: &str) -> bool {
        self.change_filter(|f| {
            f.quick_filters.remove(key);
        })
    }

    /// Reset every filter layer.
    pub fn clear_filters(&mut self) -> bool {
        self.search.cancel();
        self.change_filter(FilterState::clear)
    }

    /// Replace the whole filter state.
    pub fn set_filter(&mut self, filter: FilterState) -> bool {
        self.change_filter(|f| *f = filter)
    }

    fn change_filter(&mut self, change: impl FnOnce(&mut FilterState)) -> bool {
        let mut filter = self.filter.clone();
        change(&mut filter);
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.pagination.first_page();
        self.update_view();

        let ticket = self.issue_request();
        log::debug!("Filter changed ({})", ticket);
        self.listeners.emit(&TableEvent::FilterChange {
            filter: self.filter.clone(),
            ticket,
        });
        true
    }

    // =========================================================================
    // Sort
    // =========================================================================

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Header click: cycle the sort of a sortable column. Clicks on other
    /// columns change nothing.
    pub fn click_header(&mut self, key: &str) -> bool {
        if !self.columns.is_sortable(key) {
            log::debug!("Ignoring header click on non-sortable column '{}'", key);
            return false;
        }
        let sort = self.sort.clicked(key);
        self.set_sort(sort)
    }

    pub fn set_sort(&mut self, sort: SortState) -> bool {
        if sort == self.sort {
            return false;
        }
        self.sort = sort;
        self.update_view();

        let ticket = self.issue_request();
        self.listeners.emit(&TableEvent::SortChange {
            column_key: self.sort.column_key.clone(),
            direction: self.sort.direction,
            ticket,
        });
        true
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Go to a page (clamped). Returns true if the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        let Some(page) = self.pagination.set_page(page) else {
            return false;
        };
        self.update_view();

        let ticket = self.issue_request();
        self.listeners.emit(&TableEvent::PageChange { page, ticket });
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.pagination.page() + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.set_page(self.pagination.page().saturating_sub(1))
    }

    /// Change the page size, keeping the first visible record in view.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        let Some(page_size) = self.pagination.set_page_size(page_size) else {
            return false;
        };
        self.update_view();

        let ticket = self.issue_request();
        self.listeners.emit(&TableEvent::PageSizeChange {
            page_size,
            page: self.pagination.page(),
            ticket,
        });
        true
    }

    /// Ask the caller to reload the current page.
    pub fn refresh(&mut self) -> RequestId {
        let ticket = self.issue_request();
        self.listeners.emit(&TableEvent::RefreshRequest { ticket });
        ticket
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selection.is_selected(key)
    }

    pub fn select(&mut self, key: &str, included: bool) -> bool {
        let changed = self.selection.select(key, included);
        self.selection_changed(changed)
    }

    pub fn toggle(&mut self, key: &str) -> bool {
        let changed = self.selection.toggle(key);
        self.selection_changed(changed)
    }

    /// Select or deselect every record of the processed set. Keys outside
    /// the processed set keep their state.
    pub fn select_all(&mut self, included: bool) -> bool {
        let keys: Vec<String> = self.processed_keys().into_iter().map(str::to_string).collect();
        let changed = self.selection.select_all(&keys, included);
        self.selection_changed(changed)
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = !self.selection.clear().is_empty();
        self.selection_changed(changed)
    }

    /// Selected keys, in insertion order.
    pub fn selected_keys(&self) -> Vec<String> {
        self.selection.selected()
    }

    /// Number of selected keys that belong to the loaded records.
    pub fn selected_count(&self) -> usize {
        let known: HashSet<&str> = self.keys.iter().map(String::as_str).collect();
        self.selection.selected_among(&known).len()
    }

    /// Header checkbox state for the processed set.
    pub fn header_check(&self) -> HeaderCheck {
        self.selection.header_check(&self.processed_keys())
    }

    fn selection_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.listeners
                .emit(&TableEvent::SelectionChange(self.selection.selected()));
        }
        changed
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    pub fn set_viewport(&mut self, height: u32) {
        self.windower.set_viewport(height);
    }

    pub fn scroll_to(&mut self, offset: u64) {
        self.windower.scroll_to(offset);
    }

    pub fn scroll_by(&mut self, delta: i64) {
        self.windower.scroll_by(delta);
    }

    pub fn scroll_offset(&self) -> u64 {
        self.windower.offset()
    }

    /// Change how row heights are obtained.
    pub fn set_row_height(&mut self, row_height: RowHeight) {
        self.config.row_height = row_height;
        self.config = std::mem::take(&mut self.config).normalized();
        self.update_view();
    }

    /// Scroll the row with the given key into view, if it is on the
    /// current page.
    pub fn scroll_into_view(&mut self, key: &str) -> bool {
        let Some(position) = self.page_keys().iter().position(|k| *k == key) else {
            return false;
        };
        self.windower.scroll_into_view(position);
        true
    }

    pub fn windower(&self) -> &Windower {
        &self.windower
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Export the processed set, or only its selected rows if any are
    /// selected.
    pub fn export(&mut self, format: ExportFormat) -> Result<String> {
        let rows = self
            .processed
            .iter()
            .map(|&i| (self.keys[i].as_str(), &self.records[i]));
        let text = export::export(rows, &self.columns, format, Some(&self.selection))?;
        self.listeners.emit(&TableEvent::ExportRequest(format));
        Ok(text)
    }

    /// File name for an export in the given format.
    pub fn export_file_name(&self, format: ExportFormat) -> String {
        export::file_name(&self.config.export_file_name, format)
    }
}
