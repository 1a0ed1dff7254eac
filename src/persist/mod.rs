//! Persistence Module
//!
//! Optional whole-snapshot persistence: the entire entry map mirrored to a
//! flat key-value medium on every mutation and restored from it on startup.

mod adapter;
mod file;
mod memory;
mod store;

pub use adapter::{Compressor, PassthroughCompressor, PersistenceAdapter, SNAPSHOT_VERSION};
pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use store::SnapshotStore;
