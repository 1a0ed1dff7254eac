//! Cache Statistics Module
//!
//! Tracks cache performance counters (hits, misses, evictions) and defines
//! the point-in-time report assembled by the store on request.

use serde::Serialize;

// == Cache Stats ==
/// Running performance counters, accumulated over the life of the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted by the least-valuable policy
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Stats Snapshot ==
/// Point-in-time view of the cache, combining the running counters with
/// quantities computed by scanning the entry map.
///
/// `expired_count` counts entries currently past their TTL but not yet
/// purged (lazy expiry or the sweeper will remove them later).
/// `memory_usage` is an estimate: value payloads plus keys, tags, and
/// per-entry bookkeeping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    /// Entries currently held, live or not yet purged
    pub total_items: usize,
    /// Sum of value size estimates, in bytes
    pub total_size: usize,
    /// Sum of access counts across held entries
    pub total_access: u64,
    /// Entries past TTL still awaiting purge
    pub expired_count: usize,
    /// Cumulative hit counter
    pub hits: u64,
    /// Cumulative miss counter
    pub misses: u64,
    /// Cumulative eviction counter
    pub evictions: u64,
    /// hits / (hits + misses), 0.0 with no lookups
    pub hit_rate: f64,
    /// Estimated total memory footprint, in bytes
    pub memory_usage: usize,
}
