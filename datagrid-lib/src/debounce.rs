//! Search debouncing.
//!
//! Keystrokes are coalesced: a value is released only once no newer value
//! has been pushed for the quiet interval. The debouncer is driven by the
//! caller's clock, so it works inside any event loop and in tests.

use std::time::{Duration, Instant};

/// Default quiet interval before a search term is applied.
pub const DEFAULT_QUIET: Duration = Duration::from_millis(300);

/// Clock-driven debouncer holding at most one pending value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Replace the pending value and restart the quiet interval.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    /// Release the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|(_, deadline)| now >= *deadline);
        if ready { self.flush() } else { None }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will be released.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_restarts_interval() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.push("a", start);
        debouncer.push("ab", start + Duration::from_millis(200));

        assert_eq!(debouncer.poll(start + Duration::from_millis(400)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), Some("ab"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_cancel_drops_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.push(1, start);
        assert!(debouncer.cancel());
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
