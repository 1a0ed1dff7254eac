//! Snapshot Medium Module
//!
//! The flat key-value abstraction the persistence adapter writes through.

use crate::error::Result;

// == Snapshot Store ==
/// Flat string-key to bytes blob store used as the persistence medium.
///
/// Mirrors a browser-style local storage: a handful of named blobs, read and
/// written whole. Implementations must be shareable across tasks; the engine
/// holds them behind `Arc<dyn SnapshotStore>`.
pub trait SnapshotStore: Send + Sync {
    /// Reads the blob stored under `key`. `Ok(None)` when absent.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes `bytes` under `key`, replacing any previous blob.
    fn store(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Removes the blob under `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<()>;
}
