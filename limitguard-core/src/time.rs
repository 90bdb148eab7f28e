//! Time sources for condition timestamps
//!
//! The base limit-alarm behavior stamps every emitted condition with the
//! current time of an injected clock:
//! - System clock for production
//! - Fixed time for tests
//! - Ticking counter for replay and ordering checks

use std::cell::Cell;

/// Timestamp in milliseconds since epoch (or since start for counters)
pub type Timestamp = u64;

/// Source of time for condition events
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;
}

/// Wall clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// Counter that moves forward by `step_ms` every time it is read
///
/// Gives each emitted condition a distinct, increasing timestamp without a
/// real clock.
#[derive(Debug, Clone)]
pub struct TickingTime {
    next: Cell<Timestamp>,
    step_ms: u64,
}

impl TickingTime {
    pub fn new(start: Timestamp, step_ms: u64) -> Self {
        Self {
            next: Cell::new(start),
            step_ms,
        }
    }
}

impl TimeSource for TickingTime {
    fn now(&self) -> Timestamp {
        let now = self.next.get();
        self.next.set(now.saturating_add(self.step_ms));
        now
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        time.advance(u64::MAX);
        assert_eq!(time.now(), u64::MAX);
    }

    #[test]
    fn ticking_time_steps_on_read() {
        let time = TickingTime::new(100, 10);
        assert_eq!(time.now(), 100);
        assert_eq!(time.now(), 110);
        assert!(!time.is_wall_clock());
    }

    #[test]
    fn system_time_is_wall_clock() {
        assert!(SystemTime.is_wall_clock());
        assert!(SystemTime.now() > 0);
    }
}
