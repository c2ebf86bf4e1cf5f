//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A single cache entry: opaque value bytes plus an absolute expiry.
///
/// Entries are replaced wholesale on `set` and never mutated in place, so
/// a reader can never observe a half-written entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The serialized payload
    pub value: Vec<u8>,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// A zero TTL produces an entry that is already expired: a miss on
    /// the very next read. This is intentional, not an error.
    pub fn new(value: Vec<u8>, ttl: Duration) -> Self {
        let expires_at = current_timestamp_ms() + ttl.as_millis() as u64;
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired when the current time is
    /// greater than or equal to the expiration time, so once the TTL has
    /// fully elapsed the entry is immediately a miss -- independent of
    /// whether the background sweep has run.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
