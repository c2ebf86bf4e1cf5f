//! Query Cache - a pluggable result cache for database queries
//!
//! Provides a small `get`/`set` cache abstraction backed by interchangeable
//! stores: an in-process TTL-expiring memory store with background
//! reclamation, and a minimal hand-rolled Redis client speaking the RESP
//! wire protocol over a single persistent connection.

pub mod backend;
pub mod error;
pub mod memory;
pub mod redis;

pub(crate) mod tasks;

pub use backend::CacheBackend;
pub use error::{CacheError, Result};
pub use memory::MemoryCache;
pub use redis::{RedisCache, RedisConfig};
