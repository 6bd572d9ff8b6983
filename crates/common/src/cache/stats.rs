//! Cache statistics and metrics tracking
//!
//! Counters for how a revalidating store serves reads: hits on fresh data,
//! misses that required a fetch, deduplicated requests, and fetch results
//! discarded because the entry was mutated or unsubscribed meanwhile.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of subscribed keys
    pub size: usize,

    /// Reads answered from cached data without waiting on a fetch
    pub hits: u64,

    /// Reads that had to wait for a fetch
    pub misses: u64,

    /// Network fetches started
    pub fetches: u64,

    /// Requests that joined an in-flight or recently completed fetch
    pub dedupes: u64,

    /// Fetch results dropped because the entry changed underneath them
    pub discarded: u64,

    /// Local mutations applied
    pub mutations: u64,

    /// Entries removed after their last subscriber left
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total reads)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total number of reads (hits + misses)
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Thread-safe metrics collector for cache operations
#[derive(Debug, Clone, Default)]
pub(crate) struct MetricsCollector {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    dedupes: AtomicU64,
    discarded: AtomicU64,
    mutations: AtomicU64,
    evictions: AtomicU64,
}

impl MetricsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.inner.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch(&self) {
        self.inner.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dedupe(&self) {
        self.inner.dedupes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discard(&self) {
        self.inner.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_mutation(&self) {
        self.inner.mutations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.inner.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub(crate) fn snapshot(&self, size: usize) -> CacheStats {
        let c = &self.inner;
        CacheStats {
            size,
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            fetches: c.fetches.load(Ordering::Relaxed),
            dedupes: c.dedupes.load(Ordering::Relaxed),
            discarded: c.discarded.load(Ordering::Relaxed),
            mutations: c.mutations.load(Ordering::Relaxed),
            evictions: c.evictions.load(Ordering::Relaxed),
        }
    }
}
