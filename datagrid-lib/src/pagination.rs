//! Paginator: page arithmetic over a total record count.
//!
//! The paginator holds no record data. Every input is clamped so that
//! `1 <= page <= total_pages` always holds.

use std::ops::Range;

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Index range of the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    /// First record index on the page (0-based).
    pub start_index: usize,
    /// One past the last record index on the page.
    pub end_index: usize,
    /// Number of pages, at least 1.
    pub total_pages: usize,
}

impl PageSlice {
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// Pagination state: 1-based page, page size and total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total_count: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 0)
    }
}

impl Pagination {
    /// Start on page 1. A page size of 0 is clamped to 1.
    pub fn new(page_size: usize, total_count: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_count,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// `max(1, ceil(total_count / page_size))`.
    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size).max(1)
    }

    /// Index range of the current page.
    pub fn slice(&self) -> PageSlice {
        let start_index = (self.page - 1) * self.page_size;
        PageSlice {
            start_index: start_index.min(self.total_count),
            end_index: (start_index + self.page_size).min(self.total_count),
            total_pages: self.total_pages(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Go to a page (clamped). Returns the new page if it changed.
    pub fn set_page(&mut self, page: usize) -> Option<usize> {
        let page = page.clamp(1, self.total_pages());
        if page == self.page {
            return None;
        }
        self.page = page;
        Some(page)
    }

    pub fn next_page(&mut self) -> Option<usize> {
        self.set_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> Option<usize> {
        self.set_page(self.page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> Option<usize> {
        self.set_page(1)
    }

    pub fn last_page(&mut self) -> Option<usize> {
        self.set_page(self.total_pages())
    }

    /// Change the page size, keeping the first visible record in view.
    ///
    /// Returns the new page size if it changed. The page is recomputed so
    /// that the record previously at the top of the page is on the new page,
    /// falling back to the last page.
    pub fn set_page_size(&mut self, page_size: usize) -> Option<usize> {
        let page_size = page_size.max(1);
        if page_size == self.page_size {
            return None;
        }
        let first_visible = self.slice().start_index;
        self.page_size = page_size;
        self.page = (first_visible / page_size + 1).clamp(1, self.total_pages());
        Some(page_size)
    }

    /// Update the total count, clamping the page. Returns true if the page
    /// changed.
    pub fn set_total_count(&mut self, total_count: usize) -> bool {
        self.total_count = total_count;
        let clamped = self.page.clamp(1, self.total_pages());
        let changed = clamped != self.page;
        self.page = clamped;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_last_page_is_short() {
        let mut pagination = Pagination::new(10, 25);
        pagination.set_page(3);
        let slice = pagination.slice();
        assert_eq!(slice.range(), 20..25);
        assert_eq!(slice.total_pages, 3);
    }

    #[test]
    fn test_empty_total_has_one_page() {
        let pagination = Pagination::new(10, 0);
        assert_eq!(pagination.total_pages(), 1);
        assert!(pagination.slice().is_empty());
    }

    #[test]
    fn test_same_page_is_not_a_change() {
        let mut pagination = Pagination::new(10, 100);
        assert_eq!(pagination.set_page(1), None);
        assert_eq!(pagination.set_page(0), None);
        assert_eq!(pagination.set_page(50), Some(10));
    }

    #[test]
    fn test_page_size_keeps_first_record() {
        let mut pagination = Pagination::new(10, 100);
        pagination.set_page(4); // records 30..40
        pagination.set_page_size(25);
        assert_eq!(pagination.page(), 2); // records 25..50
        assert!(pagination.slice().range().contains(&30));
    }

    #[test]
    fn test_shrinking_total_clamps_page() {
        let mut pagination = Pagination::new(10, 100);
        pagination.set_page(10);
        assert!(pagination.set_total_count(35));
        assert_eq!(pagination.page(), 4);
    }
}
