//! Lookup metrics for one client instance.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct ClientMetrics {
    /// Lookups answered by the hot cache
    hot_hits: AtomicUsize,

    /// Lookups answered by the preloaded snapshot
    snapshot_hits: AtomicUsize,

    /// Per-string fetches sent to the service
    remote_fetches: AtomicUsize,

    /// Creation requests sent to the service
    creations: AtomicUsize,

    /// Requests that failed (not-found responses excluded)
    remote_failures: AtomicUsize,

    /// Lookups that ended without a translation
    misses: AtomicUsize,
}

impl ClientMetrics {
    pub fn record_hot_hit(&self) {
        self.hot_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_snapshot_hit(&self) {
        self.snapshot_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_fetch(&self) {
        self.remote_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_creation(&self) {
        self.creations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_failure(&self) {
        self.remote_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> MetricsReport {
        let hot_hits = self.hot_hits.load(Ordering::Relaxed);
        let snapshot_hits = self.snapshot_hits.load(Ordering::Relaxed);
        let remote_fetches = self.remote_fetches.load(Ordering::Relaxed);

        let cache_hits = hot_hits + snapshot_hits;
        let lookups = cache_hits + remote_fetches;
        let cache_hit_rate = if lookups > 0 {
            (cache_hits as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            hot_hits,
            snapshot_hits,
            remote_fetches,
            creations: self.creations.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            cache_hit_rate,
        }
    }
}

/// Point-in-time copy of [`ClientMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub hot_hits: usize,
    pub snapshot_hits: usize,
    pub remote_fetches: usize,
    pub creations: usize,
    pub remote_failures: usize,
    pub misses: usize,

    /// Share of lookups answered without a per-string fetch, as a percentage (0-100)
    pub cache_hit_rate: f64,
}
