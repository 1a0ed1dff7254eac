//! In-Memory Snapshot Store
//!
//! Mutex-guarded blob map, mainly for tests and ephemeral setups. Clone the
//! surrounding `Arc` to share one medium between engine instances.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::persist::store::SnapshotStore;

// == Memory Snapshot Store ==
/// Snapshot medium backed by an in-process map.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no blobs are held.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A panic while holding the guard poisons the mutex; the map itself
        // is still coherent, so recover the guard and continue.
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().get(key).cloned())
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_load_roundtrip() {
        let store = MemorySnapshotStore::new();

        store.store("snapshot", b"payload").unwrap();

        assert_eq!(store.load("snapshot").unwrap(), Some(b"payload".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let store = MemorySnapshotStore::new();

        assert_eq!(store.load("absent").unwrap(), None);
    }

    #[test]
    fn test_store_overwrites() {
        let store = MemorySnapshotStore::new();

        store.store("snapshot", b"first").unwrap();
        store.store("snapshot", b"second").unwrap();

        assert_eq!(store.load("snapshot").unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = MemorySnapshotStore::new();

        store.store("snapshot", b"payload").unwrap();
        store.remove("snapshot").unwrap();

        assert!(store.is_empty());
        // Removing an absent key stays a no-op
        store.remove("snapshot").unwrap();
    }
}
