//! Time sources.
//!
//! Everything that compares timestamps takes a [`Clock`] so tests can move
//! time forward without sleeping.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

/// Source of the current unix timestamp in seconds.
pub trait Clock: Send + Sync {
    fn current_timestamp(&self) -> i64;
}

/// Wall clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn current_timestamp(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can hand one clone to a
/// manager and keep another to travel with.
///
/// # Example
///
/// ```rust
/// use warden::clock::{Clock, TestClock};
///
/// let clock = TestClock::at(1_000);
/// clock.travel_into_future(10);
/// assert_eq!(clock.current_timestamp(), 1_010);
/// ```
#[derive(Debug, Clone)]
pub struct TestClock {
    now: Arc<AtomicI64>,
}

impl TestClock {
    /// Starts at the current wall clock time.
    pub fn new() -> Self {
        Self::at(Utc::now().timestamp())
    }

    pub fn at(timestamp: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(timestamp)),
        }
    }

    pub fn travel_into_future(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn travel_into_past(&self, seconds: i64) {
        self.now.fetch_sub(seconds, Ordering::SeqCst);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn current_timestamp(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
