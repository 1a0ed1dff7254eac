//! Cache Entry Module
//!
//! Defines the structure for individual cache entries: the stored value plus
//! the TTL, tag, and access-tracking metadata the engine needs for expiry,
//! eviction scoring, and stale-while-revalidate decisions.

use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A single cache entry with value and metadata.
///
/// Entries are serializable (when `T` is) so the whole store can be written
/// out as a persistence snapshot and restored later. Timestamps are wall-clock
/// Unix milliseconds, so restored entries keep a meaningful age.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Creation (or last refresh) timestamp, Unix milliseconds
    pub created_at: u64,
    /// Time-to-live in milliseconds, counted from `created_at`
    pub ttl_ms: u64,
    /// Caller-assigned labels for group invalidation
    pub tags: HashSet<String>,
    /// Number of successful, non-expired reads
    pub access_count: u64,
    /// Timestamp of the most recent successful read, Unix milliseconds
    pub last_accessed_at: u64,
    /// Serialized-size estimate of `value` in bytes, computed at insertion
    pub size_bytes: usize,
}

impl<T: Serialize> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// The size estimate is the JSON-serialized length of `value`; values
    /// that fail to serialize count as zero bytes. `last_accessed_at` starts
    /// at creation time so a never-read entry still has a defined idle time.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Time-to-live for this entry
    /// * `tags` - Labels for group invalidation (duplicates collapse)
    pub fn new(value: T, ttl: Duration, tags: Vec<String>) -> Self {
        let now = current_timestamp_ms();
        let size_bytes = serde_json::to_vec(&value).map(|b| b.len()).unwrap_or(0);

        Self {
            value,
            created_at: now,
            ttl_ms: ttl.as_millis() as u64,
            tags: tags.into_iter().collect(),
            access_count: 0,
            last_accessed_at: now,
            size_bytes,
        }
    }
}

impl<T> CacheEntry<T> {
    // == Liveness ==
    /// Milliseconds elapsed since creation (zero if the clock stepped back).
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.created_at)
    }

    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is live while `age <= ttl_ms` and expired
    /// once the age strictly exceeds it. A zero TTL therefore expires as soon
    /// as one millisecond has elapsed, not at the instant of creation.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against a caller-supplied clock reading, so a full-store
    /// sweep can evaluate every entry at one consistent instant.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at) > self.ttl_ms
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.ttl_ms.saturating_sub(self.age_ms())
    }

    // == Refresh Threshold ==
    /// Whether the entry has aged past `percent` of its TTL.
    ///
    /// Drives the stale-while-revalidate decision: a live entry past the
    /// threshold is still served but also refreshed in the background.
    ///
    /// # Arguments
    /// * `percent` - Threshold as a percentage of the TTL (0-100)
    pub fn past_refresh_threshold(&self, percent: u8) -> bool {
        let threshold_ms = self.ttl_ms.saturating_mul(percent as u64) / 100;
        self.age_ms() > threshold_ms
    }

    // == Access Tracking ==
    /// Records a successful read: bumps the access count and refreshes the
    /// last-accessed timestamp.
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_accessed_at = current_timestamp_ms();
    }

    /// Checks whether the entry carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn entry_with(value: &str, ttl_ms: u64) -> CacheEntry<String> {
        CacheEntry::new(value.to_string(), Duration::from_millis(ttl_ms), vec![])
    }

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(
            "test_value".to_string(),
            Duration::from_secs(60),
            vec!["products".to_string(), "products".to_string()],
        );

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.ttl_ms, 60_000);
        assert_eq!(entry.access_count, 0);
        assert_eq!(entry.last_accessed_at, entry.created_at);
        // Duplicate tags collapse into the set
        assert_eq!(entry.tags.len(), 1);
        assert!(entry.has_tag("products"));
        assert!(!entry.has_tag("sessions"));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_size_estimate_matches_json_length() {
        let entry = entry_with("abc", 1_000);

        // "abc" serializes to "\"abc\"" (5 bytes)
        assert_eq!(entry.size_bytes, 5);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = entry_with("test_value", 50);

        assert!(!entry.is_expired());

        // Wait for expiration
        sleep(Duration::from_millis(120));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let mut entry = entry_with("test", 1_000);

        // Exactly at TTL: still live
        entry.created_at = now - 1_000;
        assert!(!entry.is_expired_at(now), "entry at exact TTL must be live");

        // One millisecond past TTL: expired
        entry.created_at = now - 1_001;
        assert!(entry.is_expired_at(now), "entry past TTL must be expired");
    }

    #[test]
    fn test_zero_ttl_expires_after_first_millisecond() {
        let now = current_timestamp_ms();
        let mut entry = entry_with("test", 0);

        entry.created_at = now;
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + 1));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = entry_with("test_value", 10_000);

        let remaining_ms = entry.ttl_remaining_ms();
        assert!(remaining_ms <= 10_000);
        assert!(remaining_ms >= 9_000);
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let now = current_timestamp_ms();
        let mut entry = entry_with("test_value", 10);
        entry.created_at = now - 5_000;

        assert_eq!(entry.ttl_remaining_ms(), 0);
    }

    #[test]
    fn test_touch_updates_access_stats() {
        let mut entry = entry_with("test_value", 10_000);
        let created = entry.created_at;

        sleep(Duration::from_millis(5));
        entry.touch();
        entry.touch();

        assert_eq!(entry.access_count, 2);
        assert!(entry.last_accessed_at >= created);
    }

    #[test]
    fn test_refresh_threshold() {
        let now = current_timestamp_ms();
        let mut entry = entry_with("test", 1_000);

        // 40% elapsed of a 1000ms TTL with a 50% threshold: not yet past
        entry.created_at = now - 400;
        assert!(!entry.past_refresh_threshold(50));

        // 60% elapsed: past the 50% threshold, still live
        entry.created_at = now - 600;
        assert!(entry.past_refresh_threshold(50));
        assert!(!entry.is_expired_at(now));

        // Threshold of zero refreshes on any aged entry
        assert!(entry.past_refresh_threshold(0));

        // Threshold of 100 only triggers past the full TTL
        assert!(!entry.past_refresh_threshold(100));
        entry.created_at = now - 1_001;
        assert!(entry.past_refresh_threshold(100));
    }
}
