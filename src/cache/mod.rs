//! Cache Module
//!
//! The synchronous core of the engine: entries and their metadata, the
//! bounded entry store, the least-valuable eviction policy, and statistics.

mod entry;
mod eviction;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{CacheStore, Lookup};
