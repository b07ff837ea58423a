//! Outgoing table events and listener registration.
//!
//! The table never fetches data itself. Page, sort and filter changes are
//! announced to listeners together with a request ticket; the caller
//! answers with [`DataTable::receive_page`](crate::table::DataTable::receive_page).

use crate::export::ExportFormat;
use crate::filter::FilterState;
use crate::request::RequestId;
use crate::sort::SortDirection;

// =============================================================================
// Events
// =============================================================================

/// An event emitted by a table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// The current page changed.
    PageChange { page: usize, ticket: RequestId },
    /// The page size changed (the page may have been recomputed too).
    PageSizeChange {
        page_size: usize,
        page: usize,
        ticket: RequestId,
    },
    /// The active sort changed.
    SortChange {
        column_key: Option<String>,
        direction: SortDirection,
        ticket: RequestId,
    },
    /// The filter state changed.
    FilterChange { filter: FilterState, ticket: RequestId },
    /// The selection changed. Keys are in insertion order.
    SelectionChange(Vec<String>),
    /// The caller asked to reload the current page.
    RefreshRequest { ticket: RequestId },
    /// An export was produced.
    ExportRequest(ExportFormat),
}

/// Which listener list an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEventKind {
    PageChange,
    PageSizeChange,
    SortChange,
    FilterChange,
    SelectionChange,
    RefreshRequest,
    ExportRequest,
}

impl TableEvent {
    pub fn kind(&self) -> TableEventKind {
        match self {
            TableEvent::PageChange { .. } => TableEventKind::PageChange,
            TableEvent::PageSizeChange { .. } => TableEventKind::PageSizeChange,
            TableEvent::SortChange { .. } => TableEventKind::SortChange,
            TableEvent::FilterChange { .. } => TableEventKind::FilterChange,
            TableEvent::SelectionChange(_) => TableEventKind::SelectionChange,
            TableEvent::RefreshRequest { .. } => TableEventKind::RefreshRequest,
            TableEvent::ExportRequest(_) => TableEventKind::ExportRequest,
        }
    }

    /// Request ticket carried by data-changing events.
    pub fn ticket(&self) -> Option<RequestId> {
        match self {
            TableEvent::PageChange { ticket, .. }
            | TableEvent::PageSizeChange { ticket, .. }
            | TableEvent::SortChange { ticket, .. }
            | TableEvent::FilterChange { ticket, .. }
            | TableEvent::RefreshRequest { ticket } => Some(*ticket),
            TableEvent::SelectionChange(_) | TableEvent::ExportRequest(_) => None,
        }
    }
}

// =============================================================================
// Listeners
// =============================================================================

type Listener = Box<dyn FnMut(&TableEvent)>;

/// Registered event callbacks.
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<(Option<TableEventKind>, Listener)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to every event.
    pub fn on_any(&mut self, f: impl FnMut(&TableEvent) + 'static) {
        self.listeners.push((None, Box::new(f)));
    }

    fn on(&mut self, kind: TableEventKind, f: impl FnMut(&TableEvent) + 'static) {
        self.listeners.push((Some(kind), Box::new(f)));
    }

    pub fn on_page_change(&mut self, mut f: impl FnMut(usize, RequestId) + 'static) {
        self.on(TableEventKind::PageChange, move |event| {
            if let TableEvent::PageChange { page, ticket } = event {
                f(*page, *ticket);
            }
        });
    }

    pub fn on_page_size_change(&mut self, mut f: impl FnMut(usize, RequestId) + 'static) {
        self.on(TableEventKind::PageSizeChange, move |event| {
            if let TableEvent::PageSizeChange { page_size, ticket, .. } = event {
                f(*page_size, *ticket);
            }
        });
    }

    pub fn on_sort_change(&mut self, mut f: impl FnMut(Option<&str>, SortDirection, RequestId) + 'static) {
        self.on(TableEventKind::SortChange, move |event| {
            if let TableEvent::SortChange {
                column_key,
                direction,
                ticket,
            } = event
            {
                f(column_key.as_deref(), *direction, *ticket);
            }
        });
    }

    pub fn on_filter_change(&mut self, mut f: impl FnMut(&FilterState, RequestId) + 'static) {
        self.on(TableEventKind::FilterChange, move |event| {
            if let TableEvent::FilterChange { filter, ticket } = event {
                f(filter, *ticket);
            }
        });
    }

    pub fn on_selection_change(&mut self, mut f: impl FnMut(&[String]) + 'static) {
        self.on(TableEventKind::SelectionChange, move |event| {
            if let TableEvent::SelectionChange(keys) = event {
                f(keys);
            }
        });
    }

    pub fn on_refresh_request(&mut self, mut f: impl FnMut(RequestId) + 'static) {
        self.on(TableEventKind::RefreshRequest, move |event| {
            if let TableEvent::RefreshRequest { ticket } = event {
                f(*ticket);
            }
        });
    }

    pub fn on_export_request(&mut self, mut f: impl FnMut(ExportFormat) + 'static) {
        self.on(TableEventKind::ExportRequest, move |event| {
            if let TableEvent::ExportRequest(format) = event {
                f(*format);
            }
        });
    }

    /// Deliver an event to every matching listener, in registration order.
    pub fn emit(&mut self, event: &TableEvent) {
        log::trace!("Emitting {:?}", event.kind());
        let kind = event.kind();
        for (filter, listener) in &mut self.listeners {
            if filter.is_none_or(|k| k == kind) {
                listener(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::request::RequestTracker;

    #[test]
    fn test_typed_listener_only_sees_its_kind() {
        let pages = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        let sink = pages.clone();
        listeners.on_page_change(move |page, _| sink.borrow_mut().push(page));

        let mut tracker = RequestTracker::new();
        listeners.emit(&TableEvent::RefreshRequest { ticket: tracker.issue() });
        listeners.emit(&TableEvent::PageChange {
            page: 3,
            ticket: tracker.issue(),
        });

        assert_eq!(*pages.borrow(), vec![3]);
    }
}
