//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries so
//! memory is eventually reclaimed even for keys that are never read
//! again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::memory::Table;

/// Spawns the background task that periodically sweeps expired entries.
///
/// The task wakes on a fixed interval, takes the exclusive lock, and
/// removes every entry whose expiry has passed. The stop signal is
/// checked at each tick; `MemoryCache::close` fires it and awaits the
/// returned handle so the task never outlives the store.
///
/// # Arguments
/// * `table` - Shared reference to the store's entry table
/// * `interval` - Time between sweep passes
/// * `stop` - Watch receiver fired once when the store closes
pub(crate) fn spawn_sweep_task(
    table: Arc<RwLock<Table>>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("starting TTL sweep task with interval {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = {
                        let mut table = table.write().await;
                        if table.closed {
                            break;
                        }
                        let before = table.entries.len();
                        table.entries.retain(|_, entry| !entry.is_expired());
                        before - table.entries.len()
                    };

                    if removed > 0 {
                        info!("sweep removed {} expired entries", removed);
                    } else {
                        debug!("sweep found no expired entries");
                    }
                }
                _ = stop.changed() => {
                    debug!("sweep task received stop signal");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CacheBackend;
    use crate::memory::MemoryCache;

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let cache = MemoryCache::with_sweep_interval(Duration::from_millis(100));

        cache.set("expire_soon", &"value", Duration::from_millis(20)).await.unwrap();

        // Wait for the entry to expire and at least one sweep to run
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.size().await, 0, "Expired entry should have been swept");
    }

    #[tokio::test]
    async fn test_sweep_preserves_valid_entries() {
        let cache = MemoryCache::with_sweep_interval(Duration::from_millis(50));

        cache.set("long_lived", &"value", Duration::from_secs(3600)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.size().await, 1, "Valid entry should not be swept");
        assert!(cache.get("long_lived").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_stops_on_close() {
        let cache = MemoryCache::with_sweep_interval(Duration::from_millis(50));

        // close awaits the sweep task to completion
        cache.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_size_after_sweep_counts_live_entries() {
        let cache = MemoryCache::with_sweep_interval(Duration::from_millis(100));

        cache.set("dead", &"a", Duration::from_millis(20)).await.unwrap();
        cache.set("live", &"b", Duration::from_secs(3600)).await.unwrap();
        assert_eq!(cache.size().await, 2);

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.size().await, 1);
    }
}
