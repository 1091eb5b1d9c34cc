//! Cache Contract Module
//!
//! The uniform capability contract both stores implement, and the public
//! `Cache` facade that picks a store from the configuration, owns the
//! per-instance lock, and runs the janitor.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::stats::CacheStats;
use crate::cache::{LfuStore, LruStore};
use crate::config::{CacheConfig, Strategy};
use crate::error::Result;
use crate::tasks::spawn_cleanup_task;

// == Store Contract ==
/// Operations every eviction strategy provides.
///
/// Callers never see this trait; they go through [`Cache`], which hides the
/// strategy choice entirely.
pub(crate) trait Store<K, V>: Send {
    /// Inserts or overwrites an entry; `None` TTL applies the default.
    fn set(&mut self, key: K, value: V, ttl: Option<Duration>);
    /// Looks up a live entry, updating its standing with the strategy.
    /// Discovering an expired entry removes it and reports a miss.
    fn get(&mut self, key: &K) -> Option<V>;
    /// Removes an entry if present.
    fn delete(&mut self, key: &K) -> bool;
    /// Removes all entries and reinitializes the internal structures.
    fn flush(&mut self);
    /// Removes every entry expired as of `now`; returns how many.
    fn purge_expired(&mut self, now: Instant) -> usize;
    /// Number of entries currently stored.
    fn len(&self) -> usize;
    /// Snapshot of the performance counters.
    fn stats(&self) -> CacheStats;
}

/// The store behind its per-instance exclusive lock, as shared with the
/// janitor task.
pub(crate) type SharedStore<K, V> = Arc<Mutex<Box<dyn Store<K, V>>>>;

// == Cache Facade ==
/// A process-local cache with TTL expiry and a fixed eviction strategy.
///
/// Every operation, including `get` (which bumps recency or frequency),
/// serializes on one exclusive lock shared with the background sweep, so no
/// call ever observes a torn intermediate state. Share an instance across
/// tasks behind an `Arc`.
pub struct Cache<K, V> {
    store: SharedStore<K, V>,
    janitor: JoinHandle<()>,
    closed: AtomicBool,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Factory ==
    /// Builds a cache for the configured strategy and starts its janitor.
    ///
    /// Must be called from within a tokio runtime, which the janitor is
    /// spawned onto. Fails with a [`crate::ConfigError`] when the
    /// configuration cannot produce a working instance (zero capacity or a
    /// zero sweep period; an unrecognized strategy name already fails when
    /// parsing the [`Strategy`]).
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let store: Box<dyn Store<K, V>> = match config.strategy {
            Strategy::Lru => Box::new(LruStore::new(config.max_entries, config.default_ttl)),
            Strategy::Lfu => Box::new(LfuStore::new(config.max_entries, config.default_ttl)),
        };
        let store: SharedStore<K, V> = Arc::new(Mutex::new(store));
        let janitor = spawn_cleanup_task(Arc::clone(&store), config.cleanup_interval);

        Ok(Self {
            store,
            janitor,
            closed: AtomicBool::new(false),
        })
    }

    // == Set ==
    /// Stores a key-value pair, overwriting any previous entry.
    ///
    /// The entry expires `ttl` from now, or `default_ttl` when `None`.
    /// Never fails; may evict one entry to stay within capacity.
    pub async fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        self.store.lock().await.set(key, value, ttl);
    }

    // == Get ==
    /// Retrieves the value for a key.
    ///
    /// `None` is a normal miss, returned both for absent keys and for
    /// entries whose TTL has lapsed (the latter are removed on discovery).
    pub async fn get(&self, key: &K) -> Option<V> {
        self.store.lock().await.get(key)
    }

    // == Delete ==
    /// Removes an entry, reporting whether one was present.
    pub async fn delete(&self, key: &K) -> bool {
        self.store.lock().await.delete(key)
    }

    // == Flush ==
    /// Removes all entries.
    pub async fn flush(&self) {
        self.store.lock().await.flush();
    }

    // == Length ==
    /// Returns the current number of entries, expired-but-unswept included.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // == Stats ==
    /// Returns a snapshot of the performance counters.
    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    // == Close ==
    /// Stops the background sweep. Idempotent: later calls are no-ops.
    ///
    /// The cache itself stays usable after closing; expired entries are then
    /// only collected lazily on `get`. Dropping the cache also stops the
    /// sweep, so calling this is only needed to stop it early.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.janitor.abort();
            debug!("cache closed, cleanup task stopped");
        }
    }
}

impl<K, V> std::fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<K, V> Drop for Cache<K, V> {
    fn drop(&mut self) {
        // Abort on an already-finished task is a no-op
        self.janitor.abort();
    }
}
