//! File Snapshot Store
//!
//! Snapshot medium storing one file per blob key under a root directory.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::Result;
use crate::persist::store::SnapshotStore;

// == File Snapshot Store ==
/// Snapshot medium backed by flat files.
///
/// Blob keys are sanitized to filesystem-safe names (anything outside
/// `[A-Za-z0-9._-]` becomes `_`), so two keys that differ only in hostile
/// characters can collide. The intended use is a single configured snapshot
/// key, where this cannot happen.
#[derive(Debug)]
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    /// Creates the store, creating the root directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.bin", sanitized))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<()> {
        fs::write(self.path_for(key), bytes)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).unwrap();

        store.store("snapshot", b"payload").unwrap();

        assert_eq!(store.load("snapshot").unwrap(), Some(b"payload".to_vec()));
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).unwrap();

        assert_eq!(store.load("absent").unwrap(), None);
    }

    #[test]
    fn test_store_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).unwrap();

        store.store("snapshot", b"first").unwrap();
        store.store("snapshot", b"second").unwrap();

        assert_eq!(store.load("snapshot").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).unwrap();

        store.store("snapshot", b"payload").unwrap();
        store.remove("snapshot").unwrap();
        store.remove("snapshot").unwrap();

        assert_eq!(store.load("snapshot").unwrap(), None);
    }

    #[test]
    fn test_hostile_key_is_sanitized() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path()).unwrap();

        store.store("products/list:v2", b"payload").unwrap();

        assert_eq!(
            store.load("products/list:v2").unwrap(),
            Some(b"payload".to_vec())
        );
        assert!(dir.path().join("products_list_v2.bin").exists());
    }

    #[test]
    fn test_new_creates_root_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("cache").join("snapshots");

        let store = FileSnapshotStore::new(&nested).unwrap();
        store.store("snapshot", b"payload").unwrap();

        assert!(nested.exists());
    }
}
