//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries,
//! independent of whether they are ever looked up again.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{SharedStore, Store};

/// Spawns the janitor for one cache instance.
///
/// The task loops forever, sleeping for `interval` between sweeps. Each
/// sweep takes the cache's exclusive lock and removes every entry whose
/// deadline has passed, so a sweep never interleaves with a foreground
/// operation. The returned handle is owned by the cache facade, which aborts
/// it on close or drop.
pub(crate) fn spawn_cleanup_task<K, V>(
    store: SharedStore<K, V>,
    interval: Duration,
) -> JoinHandle<()>
where
    K: 'static,
    V: 'static,
{
    tokio::spawn(async move {
        info!("starting TTL cleanup task with interval {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut store = store.lock().await;
                store.purge_expired(Instant::now())
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
