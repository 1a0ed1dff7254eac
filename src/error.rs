//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror. Only the foreground
//! loader paths (`preload`, `get_or_set` miss) surface errors to callers;
//! the persistence variants exist so the adapter can log a typed failure
//! before swallowing it.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A caller-supplied loader failed on a foreground path
    #[error("Loader failed for key '{key}': {source}")]
    Loader {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Snapshot encoding or decoding failed
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The snapshot medium failed to read or write
    #[error("Snapshot storage failed: {0}")]
    Storage(#[from] std::io::Error),

    /// The persisted snapshot carries an unsupported format version
    #[error("Snapshot version {found} is not supported (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },
}

impl CacheError {
    /// Wraps a loader failure together with the key it was loading.
    pub fn loader(key: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Loader {
            key: key.into(),
            source,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
