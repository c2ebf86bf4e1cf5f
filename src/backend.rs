//! Cache Backend Trait
//!
//! The contract every backing store implements. Consumers (e.g. a query
//! interception layer that hashes outgoing SQL) hold a backend, derive
//! their own keys, and treat stored values as opaque bytes.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

// == Cache Backend ==
/// Common interface for cache backing stores.
///
/// All implementations must behave identically as observed through this
/// trait: `get` returns `Ok(None)` for absent or expired keys (the
/// designated miss signal, never an error), and `set` serializes the
/// value inside the store and writes it under `key` with the given TTL.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Retrieves the raw stored bytes for `key`.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` if a live entry exists
    /// - `Ok(None)` on a miss (absent, expired, or store unavailable)
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Serializes `value` and stores it under `key` with the given TTL.
    ///
    /// TTL semantics are backend-specific at the zero boundary: the
    /// memory store treats a zero TTL as an already-expired entry, the
    /// Redis backend treats it as "no expiry".
    async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + Send + Sync;
}
