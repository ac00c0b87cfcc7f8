//! Wall-clock timestamps for last-writer-wins resolution.
//!
//! Every mutation of an LWW structure carries a [`Timestamp`]. Callers may
//! supply their own, or let a [`Clock`] stamp operations with the current
//! time. The clock never hands out the same instant twice, so two local
//! operations on one replica are always ordered even when the system clock
//! stalls or steps backward.
//!
//! # Example
//!
//! ```
//! use lww_crdt::clock::Clock;
//!
//! let clock = Clock::new();
//! let t1 = clock.now();
//! let t2 = clock.now();
//! assert!(t2 > t1);
//! ```

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// A wall-clock instant with nanosecond precision.
///
/// Ordering is total, and equality is exact: merge decisions compare these
/// values directly, so any encoding must preserve every nanosecond.
pub type Timestamp = DateTime<Utc>;

fn system_time() -> Timestamp {
    Utc::now()
}

/// A monotonic wall clock.
///
/// Call [`now`](Clock::now) to stamp a local operation. Readings follow the
/// physical time source but are bumped by one nanosecond whenever the source
/// fails to advance past the previous reading.
#[derive(Debug)]
pub struct Clock {
    last: Mutex<Option<Timestamp>>,
    /// Physical time source. Defaults to [`Utc::now`].
    time_fn: fn() -> Timestamp,
}

impl Clock {
    /// Create a clock backed by the system time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_time_source(system_time)
    }

    /// Create a clock with a custom physical time source.
    ///
    /// Useful for tests and simulations that need reproducible timestamps.
    #[must_use]
    pub fn with_time_source(time_fn: fn() -> Timestamp) -> Self {
        Self {
            last: Mutex::new(None),
            time_fn,
        }
    }

    /// Generate a timestamp for a local event.
    ///
    /// Strictly greater than every timestamp this clock returned before.
    pub fn now(&self) -> Timestamp {
        let physical = (self.time_fn)();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        let next = match *last {
            Some(prev) if physical <= prev => prev + Duration::nanoseconds(1),
            _ => physical,
        };
        *last = Some(next);
        next
    }

    /// The last timestamp handed out, if any.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Clock {
    fn clone(&self) -> Self {
        Self {
            last: Mutex::new(self.last_timestamp()),
            time_fn: self.time_fn,
        }
    }
}
