//! Cache Store Module
//!
//! The synchronous entry map at the heart of the engine: TTL liveness with
//! lazy expiry, least-valuable eviction at capacity, tag and key-pattern
//! invalidation, and the statistics report. All methods run to completion
//! without suspension, so callers holding the store lock get atomic
//! operations; the async engine facade layers persistence and the refresh
//! helpers on top.

use std::collections::HashMap;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

use crate::cache::entry::{current_timestamp_ms, CacheEntry};
use crate::cache::eviction;
use crate::cache::stats::{CacheStats, StatsSnapshot};
use crate::options::SetOptions;

// == Lookup ==
/// Outcome of a liveness-checked lookup.
///
/// `Expired` means the key was present but past its TTL and has been removed
/// as a side effect (lazy expiry). Callers that persist snapshots use it to
/// know the store just mutated; callers that only want the value can
/// flatten it with [`Lookup::into_option`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Live entry found
    Hit(T),
    /// Key not present
    Miss,
    /// Entry was present but expired; it has been removed
    Expired,
}

impl<T> Lookup<T> {
    /// Collapses the lookup to the value, treating `Miss` and `Expired` as absent.
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Expired => None,
        }
    }

    /// True when the lookup removed an expired entry.
    pub fn removed_expired(&self) -> bool {
        matches!(self, Lookup::Expired)
    }
}

// == Cache Store ==
/// Bounded entry map with TTL expiry, least-valuable eviction, and tag
/// invalidation.
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Performance counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied to entries stored without an explicit one
    default_ttl: Duration,
}

impl<T> CacheStore<T> {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the store can hold
    /// * `default_ttl` - TTL for entries stored without an explicit one
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Has ==
    /// Liveness check with the same lazy-expiry side effect as `get`, but
    /// without touching access stats or the hit/miss counters.
    pub fn has(&mut self, key: &str) -> Lookup<()> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                self.entries.remove(key);
                Lookup::Expired
            } else {
                Lookup::Hit(())
            }
        } else {
            Lookup::Miss
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns true iff the key was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Drops all entries. The cumulative counters survive.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Tag Invalidation ==
    /// Deletes every entry whose tag set contains `tag`.
    ///
    /// Full scan of the store, O(n) in entry count. Returns the number of
    /// entries removed.
    pub fn invalidate_by_tag(&mut self, tag: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.has_tag(tag))
            .map(|(key, _)| key.clone())
            .collect();

        let count = matching.len();

        for key in matching {
            self.entries.remove(&key);
        }

        count
    }

    // == Pattern Invalidation ==
    /// Deletes every entry whose **key** matches the compiled pattern.
    ///
    /// Matches key strings, not tags. Returns the number of entries removed.
    pub fn invalidate_by_pattern(&mut self, pattern: &Regex) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        let count = matching.len();

        for key in matching {
            self.entries.remove(&key);
        }

        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, evaluating every entry against one clock
    /// reading. Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
        }

        count
    }

    // == Stats ==
    /// Assembles the point-in-time statistics report: the running counters
    /// plus totals computed by scanning the entry map.
    pub fn get_stats(&self) -> StatsSnapshot {
        let now = current_timestamp_ms();
        let mut total_size = 0usize;
        let mut total_access = 0u64;
        let mut expired_count = 0usize;
        let mut memory_usage = 0usize;

        for (key, entry) in &self.entries {
            total_size += entry.size_bytes;
            total_access += entry.access_count;
            if entry.is_expired_at(now) {
                expired_count += 1;
            }
            let tag_bytes: usize = entry.tags.iter().map(|tag| tag.len()).sum();
            memory_usage +=
                entry.size_bytes + key.len() + tag_bytes + std::mem::size_of::<CacheEntry<T>>();
        }

        StatsSnapshot {
            total_items: self.entries.len(),
            total_size,
            total_access,
            expired_count,
            hits: self.stats.hits,
            misses: self.stats.misses,
            evictions: self.stats.evictions,
            hit_rate: self.stats.hit_rate(),
            memory_usage,
        }
    }

    // == Restore ==
    /// Replaces the entry map with entries loaded from a persistence
    /// snapshot. Entries are taken as-is: expired ones fall to lazy expiry,
    /// and a map larger than `max_entries` (possible after a configuration
    /// change) shrinks one eviction per subsequent `set`.
    pub fn restore(&mut self, entries: Vec<(String, CacheEntry<T>)>) {
        self.entries = entries.into_iter().collect();
    }

    // == Accessors ==
    /// Iterates over all held entries, expired or not.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry<T>)> {
        self.entries.iter()
    }

    /// Peeks at an entry's metadata without liveness checks or stat updates.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    /// Returns the current number of entries, expired-but-unpurged included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone + Serialize> CacheStore<T> {
    // == Set ==
    /// Stores a key-value pair. Always succeeds; last write wins.
    ///
    /// The capacity check runs before every insertion, overwrites included:
    /// when the store already holds `max_entries` entries, the least
    /// valuable one is evicted first (exactly one per call, even if the
    /// store is over capacity after a restore).
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `opts` - Per-entry TTL (default applies if unset) and tags
    pub fn set(&mut self, key: String, value: T, opts: SetOptions) {
        if self.entries.len() >= self.max_entries {
            if let Some(victim) = eviction::select_victim(&self.entries, current_timestamp_ms()) {
                self.entries.remove(&victim);
                self.stats.record_eviction();
            }
        }

        let ttl = opts.ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value, ttl, opts.tags);
        self.entries.insert(key, entry);
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A live hit bumps the entry's access stats and the hit counter, and
    /// returns a clone of the value. An expired entry is removed (lazy
    /// expiry) and reported as `Lookup::Expired`; both absence and expiry
    /// count as misses.
    pub fn get(&mut self, key: &str) -> Lookup<T> {
        if let Some(entry) = self.entries.get_mut(key) {
            if entry.is_expired() {
                self.entries.remove(key);
                self.stats.record_miss();
                Lookup::Expired
            } else {
                entry.touch();
                let value = entry.value.clone();
                self.stats.record_hit();
                Lookup::Hit(value)
            }
        } else {
            self.stats.record_miss();
            Lookup::Miss
        }
    }

    // == Peek ==
    /// Liveness-checked read that bypasses access stats and the hit/miss
    /// counters, with the same lazy-expiry side effect as `get`.
    ///
    /// Used by fail-soft fallbacks that serve a stale value: the read is not
    /// a caller lookup, so it must not skew eviction scores or the hit rate.
    pub fn peek(&mut self, key: &str) -> Lookup<T> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                self.entries.remove(key);
                Lookup::Expired
            } else {
                Lookup::Hit(entry.value.clone())
            }
        } else {
            Lookup::Miss
        }
    }
}
