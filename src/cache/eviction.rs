//! Eviction Policy Module
//!
//! Implements least-valuable-entry selection for capacity eviction.
//!
//! Value is scored as `access_count / max(1, now - last_accessed_at)`: the
//! numerator rewards frequency, the denominator penalizes idle time. A
//! frequently-and-recently read entry scores high and survives; a
//! rarely-and-long-idle entry scores low and goes first. The policy is
//! stateless - it reads the metadata the entries already carry, so no
//! separate access-order structure is maintained.

use std::collections::HashMap;

use super::entry::CacheEntry;

// == Score ==
/// Computes the retention score of an entry at the given instant.
///
/// Never-accessed entries score 0.0. The idle time is clamped to one
/// millisecond so an entry read in the current millisecond divides by one,
/// not zero.
pub fn score<T>(entry: &CacheEntry<T>, now_ms: u64) -> f64 {
    let idle_ms = now_ms.saturating_sub(entry.last_accessed_at).max(1);
    entry.access_count as f64 / idle_ms as f64
}

// == Victim Selection ==
/// Picks the key to evict: the entry with the lowest score.
///
/// Ties are broken deterministically so tests are reproducible: equal scores
/// fall back to the oldest `created_at`, and equal creation times to the
/// lexicographically smallest key. Returns `None` on an empty map.
pub fn select_victim<T>(entries: &HashMap<String, CacheEntry<T>>, now_ms: u64) -> Option<String> {
    let mut victim: Option<(&String, f64, u64)> = None;

    for (key, entry) in entries {
        let entry_score = score(entry, now_ms);
        let lower = match victim {
            None => true,
            Some((victim_key, victim_score, victim_created)) => {
                entry_score < victim_score
                    || (entry_score == victim_score && entry.created_at < victim_created)
                    || (entry_score == victim_score
                        && entry.created_at == victim_created
                        && key.as_str() < victim_key.as_str())
            }
        };
        if lower {
            victim = Some((key, entry_score, entry.created_at));
        }
    }

    victim.map(|(key, _, _)| key.clone())
}
