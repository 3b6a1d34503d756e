use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::types::Direction;

/// Trait for tracking relationship operations and log traffic.
///
/// Implementations receive a callback for every edge edit, every physical log
/// append/read, every record skipped during a fold and every handle cache
/// lookup. The default implementation discards everything.
pub trait StoreMetrics: Send + Sync {
    /// Records a completed `follow`.
    fn edge_followed(&self);

    /// Records a completed `unfollow`.
    fn edge_unfollowed(&self);

    /// Records one record appended to a log.
    fn log_append(&self, direction: Direction);

    /// Records one full read of a log.
    fn log_read(&self, direction: Direction);

    /// Records a malformed line skipped while reading a log.
    fn record_skipped(&self);

    /// Records a handle cache lookup.
    ///
    /// # Parameters
    /// * `hit` - Whether a previously projected list was served.
    fn cache_lookup(&self, hit: bool);
}

/// A no-op implementation of [`StoreMetrics`].
#[derive(Default)]
pub struct NoopMetrics;

impl StoreMetrics for NoopMetrics {
    fn edge_followed(&self) {}
    fn edge_unfollowed(&self) {}
    fn log_append(&self, _direction: Direction) {}
    fn log_read(&self, _direction: Direction) {}
    fn record_skipped(&self) {}
    fn cache_lookup(&self, _hit: bool) {}
}

/// A thread-safe counter-based implementation of [`StoreMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Number of follow operations.
    pub follows: AtomicU64,

    /// Number of unfollow operations.
    pub unfollows: AtomicU64,

    /// Records appended to `following` logs.
    pub following_appends: AtomicU64,

    /// Records appended to `followers` logs.
    pub followers_appends: AtomicU64,

    /// Full reads of `following` logs.
    pub following_reads: AtomicU64,

    /// Full reads of `followers` logs.
    pub followers_reads: AtomicU64,

    /// Malformed records skipped.
    pub records_skipped: AtomicU64,

    /// Cached projections served.
    pub cache_hits: AtomicU64,

    /// Cached lookups that fell through to storage.
    pub cache_misses: AtomicU64,
}

/// Point-in-time copy of a [`CounterMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Completed follows.
    pub follows: u64,
    /// Completed unfollows.
    pub unfollows: u64,
    /// Records appended to `following` logs.
    pub following_appends: u64,
    /// Records appended to `followers` logs.
    pub followers_appends: u64,
    /// Full reads of `following` logs.
    pub following_reads: u64,
    /// Full reads of `followers` logs.
    pub followers_reads: u64,
    /// Malformed lines skipped while reading.
    pub records_skipped: u64,
    /// Cached reads served from a handle.
    pub cache_hits: u64,
    /// Cached reads that had to go to storage.
    pub cache_misses: u64,
}

impl CounterMetrics {
    /// Copies the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            follows: self.follows.load(Ordering::Relaxed),
            unfollows: self.unfollows.load(Ordering::Relaxed),
            following_appends: self.following_appends.load(Ordering::Relaxed),
            followers_appends: self.followers_appends.load(Ordering::Relaxed),
            following_reads: self.following_reads.load(Ordering::Relaxed),
            followers_reads: self.followers_reads.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}

impl StoreMetrics for CounterMetrics {
    fn edge_followed(&self) {
        self.follows.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_unfollowed(&self) {
        self.unfollows.fetch_add(1, Ordering::Relaxed);
    }

    fn log_append(&self, direction: Direction) {
        match direction {
            Direction::Following => {
                self.following_appends.fetch_add(1, Ordering::Relaxed);
            }
            Direction::Followers => {
                self.followers_appends.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn log_read(&self, direction: Direction) {
        match direction {
            Direction::Following => {
                self.following_reads.fetch_add(1, Ordering::Relaxed);
            }
            Direction::Followers => {
                self.followers_reads.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn record_skipped(&self) {
        self.records_skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Returns the default metrics implementation wrapped in an [`Arc`].
pub fn default_metrics() -> Arc<dyn StoreMetrics> {
    Arc::new(NoopMetrics)
}
