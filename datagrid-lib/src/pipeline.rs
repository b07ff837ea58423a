//! Memoized filter and sort derivation.
//!
//! The processed set is a list of indices into the loaded records. It is
//! recomputed only when its inputs change: the record page (by pointer
//! identity), the filter state or the sort state. A sort change reuses the
//! cached filter result.

use std::sync::Arc;

use crate::column::ColumnRegistry;
use crate::filter::{self, FilterState};
use crate::model::Record;
use crate::sort::{self, SortState};

#[derive(Debug, Clone)]
struct Filtered {
    records: Arc<Vec<Record>>,
    filter: FilterState,
    indices: Arc<[usize]>,
}

#[derive(Debug, Clone)]
struct Sorted {
    filtered: Arc<[usize]>,
    sort: SortState,
    indices: Arc<[usize]>,
}

/// Number of passes actually computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub filter_passes: usize,
    pub sort_passes: usize,
}

/// Cached filter → sort pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    filtered: Option<Filtered>,
    sorted: Option<Sorted>,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Drop cached results.
    pub fn invalidate(&mut self) {
        self.filtered = None;
        self.sorted = None;
    }

    /// Processed indices into `records`: filtered, then sorted.
    pub fn run(
        &mut self,
        records: &Arc<Vec<Record>>,
        filter: &FilterState,
        sort: &SortState,
        columns: &ColumnRegistry,
    ) -> Arc<[usize]> {
        let filtered = self.filter(records, filter, columns);

        if let Some(cached) = &self.sorted
            && Arc::ptr_eq(&cached.filtered, &filtered)
            && cached.sort == *sort
        {
            return cached.indices.clone();
        }

        let mut indices = filtered.to_vec();
        sort::sort_indices(records, &mut indices, sort, columns);
        self.stats.sort_passes += 1;

        let indices: Arc<[usize]> = indices.into();
        self.sorted = Some(Sorted {
            filtered,
            sort: sort.clone(),
            indices: indices.clone(),
        });
        indices
    }

    fn filter(&mut self, records: &Arc<Vec<Record>>, state: &FilterState, columns: &ColumnRegistry) -> Arc<[usize]> {
        if let Some(cached) = &self.filtered
            && Arc::ptr_eq(&cached.records, records)
            && cached.filter == *state
        {
            return cached.indices.clone();
        }

        let indices: Arc<[usize]> = filter::filter_indices(records, state, columns).into();
        self.stats.filter_passes += 1;
        log::debug!("Filtered {} of {} records", indices.len(), records.len());

        self.filtered = Some(Filtered {
            records: records.clone(),
            filter: state.clone(),
            indices: indices.clone(),
        });
        indices
    }
}
