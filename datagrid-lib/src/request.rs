//! Page request tickets.
//!
//! Every outgoing data request carries a ticket. When pages arrive out of
//! order, only the page answering the most recent request is accepted.

use std::fmt;

/// Ticket of an outgoing data request. Tickets increase monotonically
/// within one tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Issues tickets and decides which arrivals are current.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    next: u64,
    latest: Option<RequestId>,
    pending: bool,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket. Earlier tickets become stale.
    pub fn issue(&mut self) -> RequestId {
        self.next += 1;
        let id = RequestId(self.next);
        self.latest = Some(id);
        self.pending = true;
        id
    }

    pub fn latest(&self) -> Option<RequestId> {
        self.latest
    }

    pub fn is_latest(&self, id: RequestId) -> bool {
        self.latest == Some(id)
    }

    /// Whether the latest request is still unanswered.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Accept an arrival. Returns false (and logs) for stale tickets.
    pub fn accept(&mut self, id: RequestId) -> bool {
        if !self.is_latest(id) {
            log::debug!(
                "Dropping stale response {} (latest is {:?})",
                id,
                self.latest.map(|l| l.to_string())
            );
            return false;
        }
        self.pending = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_request_wins() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue();
        let second = tracker.issue();
        assert!(first < second);

        assert!(!tracker.accept(first));
        assert!(tracker.is_pending());
        assert!(tracker.accept(second));
        assert!(!tracker.is_pending());
    }
}
