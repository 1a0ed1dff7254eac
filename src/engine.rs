//! Cache Engine Module
//!
//! The async facade callers share: a `CacheStore` behind
//! `Arc<tokio::sync::RwLock<_>>`, the optional persistence adapter, and the
//! background expiry sweeper. Every store operation is mirrored as an async
//! method that takes the lock, applies the operation, and refreshes the
//! persistence snapshot while still holding the lock, so the blob always
//! matches the store as of that operation's completion.
//!
//! The refresh helpers (`preload`, `refresh`, `get_or_set`) wrap a
//! caller-supplied async loader. Loaders are awaited with no lock held, so
//! concurrent logical operations can interleave at those suspension points;
//! the store itself is only ever mutated under the lock.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use regex::Regex;

use crate::cache::{CacheStore, Lookup, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::options::{GetOrSetOptions, PreloadOptions, SetOptions};
use crate::persist::{PersistenceAdapter, SnapshotStore};
use crate::tasks::spawn_sweeper_task;

// == Intelligent Cache ==
/// Generic TTL-based, tag-addressable in-process cache with least-valuable
/// eviction, stale-while-revalidate refresh helpers, and optional
/// whole-snapshot persistence.
///
/// One instance per process is the intended deployment (construct once,
/// share via `Arc`); one instance per test is the intended test setup. The
/// engine spawns its expiry sweeper at construction and aborts it on
/// [`destroy`](Self::destroy) or drop.
pub struct IntelligentCache<T> {
    /// Shared entry store; all mutation happens under this lock
    store: Arc<RwLock<CacheStore<T>>>,
    /// Snapshot adapter, present iff persistence is enabled with a medium
    persistence: Option<Arc<PersistenceAdapter>>,
    /// Construction-time configuration, immutable thereafter
    config: CacheConfig,
    /// Sweeper handle; taken on destroy so a second destroy is a no-op
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<T> IntelligentCache<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates an engine with no snapshot medium.
    ///
    /// Must be called within a tokio runtime (the sweeper is spawned here).
    /// If the configuration asks for persistence, the engine logs a warning
    /// and runs in-memory-only; use [`with_snapshot_store`] to supply a
    /// medium.
    ///
    /// [`with_snapshot_store`]: Self::with_snapshot_store
    pub fn new(config: CacheConfig) -> Self {
        if config.persistence_enabled {
            warn!("Persistence enabled but no snapshot medium supplied; running in-memory only");
        }
        Self::build(config, None)
    }

    /// Creates an engine persisting to the given snapshot medium.
    ///
    /// When persistence is enabled, construction attempts to restore the
    /// entry map from the medium; restoration failures are logged and leave
    /// the cache empty. With persistence disabled the medium is ignored.
    pub fn with_snapshot_store(config: CacheConfig, medium: Arc<dyn SnapshotStore>) -> Self {
        let persistence = if config.persistence_enabled {
            Some(Arc::new(PersistenceAdapter::new(
                medium,
                config.persistence_key.clone(),
                config.compression_enabled,
            )))
        } else {
            debug!("Snapshot medium supplied but persistence is disabled; ignoring it");
            None
        };
        Self::build(config, persistence)
    }

    fn build(config: CacheConfig, persistence: Option<Arc<PersistenceAdapter>>) -> Self {
        let mut store = CacheStore::new(config.max_entries, config.default_ttl);

        if let Some(adapter) = &persistence {
            if let Some(entries) = adapter.load::<T>() {
                info!(
                    "Restored {} cache entries from snapshot '{}'",
                    entries.len(),
                    adapter.key()
                );
                store.restore(entries);
            }
        }

        let store = Arc::new(RwLock::new(store));
        let sweeper = spawn_sweeper_task(
            Arc::clone(&store),
            config.sweep_interval,
            persistence.clone(),
        );

        Self {
            store,
            persistence,
            config,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// The configuration the engine was constructed with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn persist(&self, store: &CacheStore<T>) {
        if let Some(adapter) = &self.persistence {
            adapter.save(store);
        }
    }

    // == Core Operations ==
    /// Stores a key-value pair. Always succeeds; last write wins. May evict
    /// the least valuable entry first when the store is at capacity.
    pub async fn set(&self, key: impl Into<String>, value: T, opts: SetOptions) {
        let mut store = self.store.write().await;
        store.set(key.into(), value, opts);
        self.persist(&store);
    }

    /// Retrieves a live value by key, bumping its access stats.
    ///
    /// An expired entry is removed as a side effect (lazy expiry) and the
    /// snapshot refreshed; both absence and expiry read as `None`.
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut store = self.store.write().await;
        let lookup = store.get(key);
        if lookup.removed_expired() {
            self.persist(&store);
        }
        lookup.into_option()
    }

    /// Liveness check with the same lazy-expiry side effect as `get`, but
    /// without touching access stats or the hit/miss counters.
    pub async fn has(&self, key: &str) -> bool {
        let mut store = self.store.write().await;
        let lookup = store.has(key);
        if lookup.removed_expired() {
            self.persist(&store);
        }
        matches!(lookup, Lookup::Hit(()))
    }

    /// Removes an entry by key. Returns true iff the key was present.
    pub async fn delete(&self, key: &str) -> bool {
        let mut store = self.store.write().await;
        let removed = store.delete(key);
        self.persist(&store);
        removed
    }

    /// Drops all entries. The cumulative counters survive.
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        store.clear();
        self.persist(&store);
    }

    // == Invalidation ==
    /// Deletes every entry carrying `tag`; returns the number removed.
    pub async fn invalidate_by_tag(&self, tag: &str) -> usize {
        let mut store = self.store.write().await;
        let removed = store.invalidate_by_tag(tag);
        self.persist(&store);
        debug!("Invalidated {} entries by tag '{}'", removed, tag);
        removed
    }

    /// Deletes every entry whose **key** matches the compiled pattern;
    /// returns the number removed.
    pub async fn invalidate_by_pattern(&self, pattern: &Regex) -> usize {
        let mut store = self.store.write().await;
        let removed = store.invalidate_by_pattern(pattern);
        self.persist(&store);
        debug!("Invalidated {} entries by pattern '{}'", removed, pattern);
        removed
    }

    // == Stats ==
    /// Assembles the point-in-time statistics report.
    pub async fn get_stats(&self) -> StatsSnapshot {
        self.store.read().await.get_stats()
    }

    // == Refresh Helpers ==
    /// Populates a key ahead of demand.
    ///
    /// Unless `force` is set, a live entry short-circuits the loader and is
    /// returned as a normal read (it counts as a hit). Otherwise the loader
    /// runs, its result is stored, and the value returned. Loader failures
    /// propagate as [`CacheError::Loader`] and leave the key unset.
    pub async fn preload<F, Fut>(&self, key: &str, loader: F, opts: PreloadOptions) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        if !opts.force {
            let mut store = self.store.write().await;
            match store.get(key) {
                Lookup::Hit(value) => return Ok(value),
                lookup => {
                    if lookup.removed_expired() {
                        self.persist(&store);
                    }
                }
            }
        }

        let value = loader()
            .await
            .map_err(|source| CacheError::loader(key, source))?;

        let mut store = self.store.write().await;
        store.set(key.to_string(), value.clone(), opts.into());
        self.persist(&store);
        Ok(value)
    }

    /// Unconditionally reloads a key, overwriting the entry.
    ///
    /// Fail-soft: on loader failure the stale cached value is returned if
    /// one is still live, `None` otherwise. This method never surfaces an
    /// error; the failure is warn-logged.
    pub async fn refresh<F, Fut>(&self, key: &str, loader: F, opts: SetOptions) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match loader().await {
            Ok(value) => {
                let mut store = self.store.write().await;
                store.set(key.to_string(), value.clone(), opts);
                self.persist(&store);
                Some(value)
            }
            Err(err) => {
                warn!(
                    "Refresh loader failed for key '{}', serving stale value: {}",
                    key, err
                );
                // The fallback is not a caller lookup: peek leaves access
                // stats and the hit/miss counters alone.
                let mut store = self.store.write().await;
                let lookup = store.peek(key);
                if lookup.removed_expired() {
                    self.persist(&store);
                }
                lookup.into_option()
            }
        }
    }

    /// The primary caller-facing read: returns the live value, loading and
    /// storing it on a miss.
    ///
    /// With `refresh_threshold` set, a live entry that has aged past that
    /// percentage of its TTL is still returned immediately, but a detached
    /// revalidation task is spawned to reload it before it expires
    /// (stale-while-revalidate). Errors from that task are logged and
    /// swallowed, never surfaced to this caller.
    ///
    /// The miss path is deliberately not stampede-protected: concurrent
    /// callers for the same missing key each invoke the loader
    /// independently.
    pub async fn get_or_set<F, Fut>(&self, key: &str, loader: F, opts: GetOrSetOptions) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        {
            let mut store = self.store.write().await;
            match store.get(key) {
                Lookup::Hit(value) => {
                    // Hit path: maybe kick off a background revalidation,
                    // but serve the current value either way.
                    let aging_entry = opts.refresh_threshold.and_then(|percent| {
                        store
                            .entry(key)
                            .filter(|entry| entry.past_refresh_threshold(percent))
                            .map(|entry| entry.created_at)
                    });
                    drop(store);

                    if let Some(created_at) = aging_entry {
                        self.spawn_revalidation(key.to_string(), created_at, loader, opts.into());
                    }
                    return Ok(value);
                }
                lookup => {
                    if lookup.removed_expired() {
                        self.persist(&store);
                    }
                }
            }
        }

        // Miss path: load inline with no lock held
        let value = loader()
            .await
            .map_err(|source| CacheError::loader(key, source))?;

        let mut store = self.store.write().await;
        store.set(key.to_string(), value.clone(), opts.into());
        self.persist(&store);
        Ok(value)
    }

    /// Spawns the detached revalidation task for an aging hit.
    ///
    /// The task reloads the value and overwrites the entry only if it still
    /// exists with the `created_at` captured at the triggering hit, so a key
    /// deleted, invalidated, or replaced while the load was in flight is not
    /// resurrected. Loader failures are warn-logged and discarded.
    fn spawn_revalidation<F, Fut>(&self, key: String, created_at: u64, loader: F, opts: SetOptions)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let persistence = self.persistence.clone();

        tokio::spawn(async move {
            match loader().await {
                Ok(value) => {
                    let mut store = store.write().await;
                    let unchanged = store
                        .entry(&key)
                        .map(|entry| entry.created_at == created_at)
                        .unwrap_or(false);
                    if unchanged {
                        store.set(key, value, opts);
                        if let Some(adapter) = &persistence {
                            adapter.save(&store);
                        }
                    } else {
                        debug!(
                            "Discarding revalidation for key '{}': entry changed in flight",
                            key
                        );
                    }
                }
                Err(err) => {
                    warn!("Background revalidation failed for key '{}': {}", key, err);
                }
            }
        });
    }

    // == Teardown ==
    /// Tears the engine down: aborts the sweeper and clears the store.
    ///
    /// The cleared state is not persisted; the snapshot keeps the last
    /// mutated state so a later engine over the same medium can restore it.
    /// Calling `destroy` twice is a no-op the second time.
    pub async fn destroy(&self) {
        if let Some(handle) = self.take_sweeper() {
            handle.abort();
        }
        let mut store = self.store.write().await;
        store.clear();
        info!("Cache engine destroyed: sweeper aborted, store cleared");
    }
}

impl<T> IntelligentCache<T> {
    fn take_sweeper(&self) -> Option<JoinHandle<()>> {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<T> Drop for IntelligentCache<T> {
    fn drop(&mut self) {
        // An engine leaked out of a test must not keep its sweeper alive
        if let Some(handle) = self.take_sweeper() {
            handle.abort();
        }
    }
}
