//! Intelligent Cache - a generic in-process cache engine
//!
//! TTL-based, tag-addressable memory cache with least-valuable eviction, a
//! background expiry sweeper, stale-while-revalidate refresh helpers, and
//! optional whole-snapshot persistence to a flat key-value medium.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod options;
pub mod persist;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, CacheStore, Lookup, StatsSnapshot};
pub use config::CacheConfig;
pub use engine::IntelligentCache;
pub use error::{CacheError, Result};
pub use options::{GetOrSetOptions, PreloadOptions, SetOptions};
pub use persist::{
    Compressor, FileSnapshotStore, MemorySnapshotStore, PassthroughCompressor,
    PersistenceAdapter, SnapshotStore,
};
pub use tasks::spawn_sweeper_task;
