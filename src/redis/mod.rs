//! Redis Backend
//!
//! A minimal hand-rolled client for the RESP wire protocol, built without
//! any protocol library. One persistent connection, a command encoder, a
//! reply decoder, and a connection-time handshake (AUTH, SELECT).

mod client;
mod resp;

// Re-export public types
pub use client::{RedisCache, RedisConfig};
