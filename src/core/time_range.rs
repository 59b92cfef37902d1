//! Time window shown alongside the spatial region.
//!
//! The window is owned by whoever drives the time scrubber, usually the UI
//! thread, and is read by the tracker at dispatch time.

use std::sync::atomic::{AtomicI64, Ordering};

/// Supplies the `(min_time, max_time)` bounds for each dispatch pass
pub trait TimeRangeSource: Send + Sync {
    fn time_range(&self) -> (i64, i64);
}

/// A time window described by a start and a period, both in seconds.
///
/// Updates from one thread and reads from another never block each other.
/// The start and period are stored separately, so a reader racing a writer
/// may pair the new start with the old period for a single pass; the next
/// dispatch picks up the consistent pair.
#[derive(Debug, Default)]
pub struct SharedTimeRange {
    start_sec: AtomicI64,
    period_sec: AtomicI64,
}

impl SharedTimeRange {
    pub fn new(start_sec: i64, period_sec: i64) -> Self {
        Self {
            start_sec: AtomicI64::new(start_sec),
            period_sec: AtomicI64::new(period_sec),
        }
    }

    pub fn set(&self, start_sec: i64, period_sec: i64) {
        self.start_sec.store(start_sec, Ordering::Release);
        self.period_sec.store(period_sec, Ordering::Release);
    }

    pub fn start_sec(&self) -> i64 {
        self.start_sec.load(Ordering::Acquire)
    }

    pub fn period_sec(&self) -> i64 {
        self.period_sec.load(Ordering::Acquire)
    }
}

impl TimeRangeSource for SharedTimeRange {
    fn time_range(&self) -> (i64, i64) {
        let start = self.start_sec();
        (start, start.saturating_add(self.period_sec()))
    }
}

/// A fixed window, handy when the application has no time scrubber
impl TimeRangeSource for (i64, i64) {
    fn time_range(&self) -> (i64, i64) {
        *self
    }
}
