//! Time sources and the ledger-wide timestamp sequence
//!
//! The engine never reads the wall clock directly: it is handed a [`Clock`] at
//! construction, and every assigned timestamp goes through a single
//! [`TimestampSequence`] owned by the engine. Tests and replays use
//! [`ManualClock`] to make timestamp assignment deterministic.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{Timestamp, TIMESTAMP_MAX, TIMESTAMP_MIN};

/// Source of "now" in nanoseconds since the UNIX epoch
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(TIMESTAMP_MAX))
            .unwrap_or(TIMESTAMP_MIN)
            .clamp(TIMESTAMP_MIN, TIMESTAMP_MAX)
    }
}

/// Clock that only moves when told to
///
/// Shared between the engine and the test driving it through an `Arc`.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        ManualClock {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, nanos: u64) {
        self.now.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Strictly increasing timestamp counter
///
/// Holds the highest timestamp ever assigned or imported. It is initialised
/// from a persisted high-water mark so that timestamps stay monotonic across
/// restarts even when the wall clock moves backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampSequence {
    last: Timestamp,
}

impl TimestampSequence {
    pub fn new(high_water_mark: Timestamp) -> Self {
        TimestampSequence {
            last: high_water_mark,
        }
    }

    /// Highest timestamp handed out so far (zero if none)
    pub fn last(&self) -> Timestamp {
        self.last
    }

    /// The timestamp the next event would get, without consuming it
    ///
    /// Saturates at `TIMESTAMP_MAX`.
    pub fn peek(&self, now: Timestamp) -> Timestamp {
        now.max(self.last.saturating_add(1)).min(TIMESTAMP_MAX)
    }

    /// Record that `timestamp` has been used
    pub fn advance_to(&mut self, timestamp: Timestamp) {
        self.last = self.last.max(timestamp);
    }
}
