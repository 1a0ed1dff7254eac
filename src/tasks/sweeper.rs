//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries. The
//! sweeper is purely memory reclamation: expiry correctness is already
//! guaranteed by the lazy check in `get`/`has`, so a delayed sweep can only
//! delay reclamation, never cause a stale read.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::persist::PersistenceAdapter;

/// Spawns a background task that periodically purges expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the given interval between
/// sweeps. Each sweep takes the write lock, removes every expired entry, and,
/// when something was removed and persistence is configured, writes one
/// snapshot while still holding the lock so the blob matches the store.
///
/// # Arguments
/// * `cache` - Shared reference to the cache store
/// * `interval` - Time between sweeps
/// * `persistence` - Snapshot adapter, if persistence is enabled
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop sweeping.
pub fn spawn_sweeper_task<T>(
    cache: Arc<RwLock<CacheStore<T>>>,
    interval: Duration,
    persistence: Option<Arc<PersistenceAdapter>>,
) -> JoinHandle<()>
where
    T: Serialize + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting expiry sweeper with interval of {:?}", interval);

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            // Acquire write lock, purge, and snapshot once per productive sweep
            let removed = {
                let mut cache_guard = cache.write().await;
                let removed = cache_guard.cleanup_expired();
                if removed > 0 {
                    if let Some(adapter) = &persistence {
                        adapter.save(&*cache_guard);
                    }
                }
                removed
            };

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
