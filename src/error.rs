//! Error types for the cache core
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache core.
///
/// A cache miss is not an error: `get` reports it as `Ok(None)`. The
/// [`CacheError::Miss`] variant exists only as the designated
/// miss/unavailable signal that a closed store returns from `set` --
/// callers cannot distinguish a closed-store write from an ordinary miss.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Designated miss/unavailable signal (store closed)
    #[error("cache miss")]
    Miss,

    /// Value could not be serialized to bytes
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Socket could not be opened or was lost mid-operation
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// Credential rejected by the remote peer during the handshake
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Peer error reply or malformed reply framing
    #[error("protocol error: {0}")]
    Protocol(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache core.
pub type Result<T> = std::result::Result<T, CacheError>;
