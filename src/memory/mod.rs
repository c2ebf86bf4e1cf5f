//! In-Memory TTL Store
//!
//! Provides an in-process key/value table with per-entry absolute expiry
//! and a periodic background sweep that reclaims dead entries.

mod entry;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use store::MemoryCache;

pub(crate) use store::Table;

use std::time::Duration;

// == Public Constants ==
/// Interval between background sweep passes
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
