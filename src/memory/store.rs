//! Memory Store Module
//!
//! Concurrent HashMap-backed store with TTL expiration and a background
//! sweep task owned by the store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::backend::CacheBackend;
use crate::error::{CacheError, Result};
use crate::memory::{CacheEntry, SWEEP_INTERVAL};
use crate::tasks::spawn_sweep_task;

// == Table ==
/// Shared table state: the entry map plus the closed flag, guarded
/// together so the sweep and writers agree on liveness.
#[derive(Debug)]
pub(crate) struct Table {
    /// Key-value storage
    pub(crate) entries: HashMap<String, CacheEntry>,
    /// Set once by `close`; writes after this report the miss signal
    pub(crate) closed: bool,
}

// == Memory Cache ==
/// In-memory cache backend with TTL expiration and background sweeping.
///
/// Reads proceed concurrently under a shared lock; `set`, the sweep, and
/// `close` take the exclusive lock. Expired entries are a miss from the
/// moment their TTL elapses -- the sweep only reclaims memory, it is not
/// part of the liveness check.
pub struct MemoryCache {
    /// Shared entry table
    table: Arc<RwLock<Table>>,
    /// Stop signal for the sweep task
    stop: watch::Sender<bool>,
    /// Sweep task handle, taken and awaited by `close`
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates a new memory cache and starts its background sweep task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        Self::with_sweep_interval(SWEEP_INTERVAL)
    }

    /// Creates a new memory cache sweeping at a custom interval.
    ///
    /// # Arguments
    /// * `interval` - Time between background sweep passes
    pub fn with_sweep_interval(interval: Duration) -> Self {
        let table = Arc::new(RwLock::new(Table {
            entries: HashMap::new(),
            closed: false,
        }));
        let (stop, stop_rx) = watch::channel(false);
        let sweeper = spawn_sweep_task(Arc::clone(&table), interval, stop_rx);

        Self {
            table,
            stop,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    // == Close ==
    /// Stops the background sweep task and discards the table.
    ///
    /// Idempotent: a second close has no additional effect and never
    /// errors. After close, `get` reports a miss and `set` returns the
    /// designated miss/unavailable signal.
    pub async fn close(&self) -> Result<()> {
        {
            let mut table = self.table.write().await;
            if table.closed {
                return Ok(());
            }
            table.closed = true;
            table.entries = HashMap::new();
        }

        // Signal the sweep task and wait for it to wind down
        let _ = self.stop.send(true);
        if let Some(handle) = self.sweeper.lock().await.take() {
            let _ = handle.await;
        }

        Ok(())
    }

    // == Size ==
    /// Returns the current number of entries in the table.
    ///
    /// Includes entries that are stale but not yet swept, so this is an
    /// approximation of live entries until the next sweep runs.
    pub async fn size(&self) -> usize {
        self.table.read().await.entries.len()
    }
}

// == Cache Backend Implementation ==
#[async_trait]
impl CacheBackend for MemoryCache {
    /// Retrieves a value by key.
    ///
    /// Takes only the shared lock: a stale entry discovered here is
    /// reported as a miss and left for the sweep to reclaim.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let table = self.table.read().await;
        if table.closed {
            return Ok(None);
        }

        match table.entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    /// Serializes `value` and stores it under `key` with the given TTL.
    ///
    /// Serialization happens before the lock is taken, so a failing value
    /// never causes a partial write. A zero TTL stores an entry that is
    /// already expired on the next read.
    async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let data = serde_json::to_vec(value)?;

        let mut table = self.table.write().await;
        if table.closed {
            // Closed store reports the same signal as a cache miss
            return Err(CacheError::Miss);
        }

        table.entries.insert(key.to_string(), CacheEntry::new(data, ttl));
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache() -> MemoryCache {
        // Long sweep interval keeps the sweep out of the way of lazy-path tests
        MemoryCache::with_sweep_interval(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache = test_cache();

        let value = cache.get("missing").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = test_cache();

        cache.set("key1", &"value1", Duration::from_secs(60)).await.unwrap();
        let value = cache.get("key1").await.unwrap().unwrap();

        let decoded: String = serde_json::from_slice(&value).unwrap();
        assert_eq!(decoded, "value1");
    }

    #[tokio::test]
    async fn test_set_overwrites_entry() {
        let cache = test_cache();

        cache.set("key1", &"value1", Duration::from_secs(60)).await.unwrap();
        cache.set("key1", &"value2", Duration::from_secs(60)).await.unwrap();

        let value = cache.get("key1").await.unwrap().unwrap();
        let decoded: String = serde_json::from_slice(&value).unwrap();
        assert_eq!(decoded, "value2");
        assert_eq!(cache.size().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_immediate_miss() {
        let cache = test_cache();

        cache.set("key1", &"value1", Duration::ZERO).await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_none());
        // The stale entry stays in the table until the sweep runs
        assert_eq!(cache.size().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_without_sweep() {
        let cache = test_cache();

        cache.set("key1", &"value1", Duration::from_millis(50)).await.unwrap();
        assert!(cache.get("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let cache = test_cache();

        cache.close().await.unwrap();
        cache.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_after_close_is_miss() {
        let cache = test_cache();

        cache.set("key1", &"value1", Duration::from_secs(60)).await.unwrap();
        cache.close().await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_after_close_reports_miss_signal() {
        let cache = test_cache();

        cache.close().await.unwrap();

        let result = cache.set("key1", &"value1", Duration::from_secs(60)).await;
        assert!(matches!(result, Err(CacheError::Miss)));
    }

    #[tokio::test]
    async fn test_size_counts_entries() {
        let cache = test_cache();

        assert_eq!(cache.size().await, 0);
        cache.set("a", &1, Duration::from_secs(60)).await.unwrap();
        cache.set("b", &2, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.size().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(test_cache());

        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let key = format!("key{}", i % 4);
                cache.set(&key, &i, Duration::from_secs(60)).await.unwrap();
                cache.get(&key).await.unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.size().await, 4);
    }

    #[tokio::test]
    async fn test_scenario_set_get_expire() {
        let cache = test_cache();

        assert!(cache.get("x").await.unwrap().is_none());

        cache.set("x", &"1", Duration::from_millis(100)).await.unwrap();
        let value = cache.get("x").await.unwrap().unwrap();
        let decoded: String = serde_json::from_slice(&value).unwrap();
        assert_eq!(decoded, "1");

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get("x").await.unwrap().is_none());
    }
}
