//! Persistence Adapter Module
//!
//! Whole-snapshot persistence: after every mutating operation the entire
//! entry map is serialized into a versioned JSON envelope and written to the
//! snapshot medium under one configured key; on engine construction the same
//! key is read back to restore the map. Every failure in here is logged and
//! swallowed - persistence is best-effort and never fails a cache operation.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStore};
use crate::error::{CacheError, Result};
use crate::persist::store::SnapshotStore;

/// Current snapshot format version. No cross-version compatibility is
/// attempted: a mismatch restores as an empty cache.
pub const SNAPSHOT_VERSION: u32 = 1;

// == Compressor ==
/// Strategy hook snapshot bytes are routed through when compression is
/// enabled on the engine configuration.
pub trait Compressor: Send + Sync {
    fn compress(&self, bytes: Vec<u8>) -> Result<Vec<u8>>;
    fn decompress(&self, bytes: Vec<u8>) -> Result<Vec<u8>>;
}

/// Identity strategy: blobs are stored exactly as serialized.
#[derive(Debug, Default)]
pub struct PassthroughCompressor;

impl Compressor for PassthroughCompressor {
    fn compress(&self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        Ok(bytes)
    }

    fn decompress(&self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        Ok(bytes)
    }
}

// == Snapshot Envelope ==
// Write side borrows the live entries so a save never clones values.
#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    version: u32,
    saved_at: String,
    entries: Vec<(&'a String, &'a CacheEntry<T>)>,
}

#[derive(Deserialize)]
struct Snapshot<T> {
    version: u32,
    saved_at: String,
    entries: Vec<(String, CacheEntry<T>)>,
}

// == Persistence Adapter ==
/// Binds a snapshot medium, the configured blob key, and the compression
/// strategy.
pub struct PersistenceAdapter {
    medium: Arc<dyn SnapshotStore>,
    key: String,
    compression_enabled: bool,
    compressor: Box<dyn Compressor>,
}

impl PersistenceAdapter {
    /// Creates an adapter with the passthrough compression strategy.
    pub fn new(
        medium: Arc<dyn SnapshotStore>,
        key: impl Into<String>,
        compression_enabled: bool,
    ) -> Self {
        Self {
            medium,
            key: key.into(),
            compression_enabled,
            compressor: Box::new(PassthroughCompressor),
        }
    }

    /// Replaces the compression strategy.
    pub fn with_compressor(mut self, compressor: Box<dyn Compressor>) -> Self {
        self.compressor = compressor;
        self
    }

    /// The blob key snapshots are stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    // == Save ==
    /// Serializes the whole store to the medium. Failures are logged and
    /// swallowed so a broken medium degrades the cache to in-memory-only.
    pub fn save<T: Serialize>(&self, store: &CacheStore<T>) {
        if let Err(err) = self.try_save(store) {
            warn!("Failed to persist cache snapshot '{}': {}", self.key, err);
        }
    }

    fn try_save<T: Serialize>(&self, store: &CacheStore<T>) -> Result<()> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now().to_rfc3339(),
            entries: store.iter().collect(),
        };

        let bytes = serde_json::to_vec(&snapshot)?;
        let bytes = if self.compression_enabled {
            self.compressor.compress(bytes)?
        } else {
            bytes
        };

        self.medium.store(&self.key, &bytes)
    }

    // == Load ==
    /// Reads the snapshot back. Any failure (missing blob, IO error, corrupt
    /// JSON, version mismatch) yields `None` so the engine starts empty
    /// instead of crashing.
    pub fn load<T: DeserializeOwned>(&self) -> Option<Vec<(String, CacheEntry<T>)>> {
        match self.try_load() {
            Ok(Some(entries)) => Some(entries),
            Ok(None) => {
                debug!("No cache snapshot found under '{}'", self.key);
                None
            }
            Err(err) => {
                warn!("Failed to restore cache snapshot '{}': {}", self.key, err);
                None
            }
        }
    }

    fn try_load<T: DeserializeOwned>(&self) -> Result<Option<Vec<(String, CacheEntry<T>)>>> {
        let bytes = match self.medium.load(&self.key)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let bytes = if self.compression_enabled {
            self.compressor.decompress(bytes)?
        } else {
            bytes
        };

        let snapshot: Snapshot<T> = serde_json::from_slice(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CacheError::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        debug!(
            "Restoring cache snapshot '{}' saved at {}",
            self.key, snapshot.saved_at
        );
        Ok(Some(snapshot.entries))
    }
}
