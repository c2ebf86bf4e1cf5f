//! Redis Client Module
//!
//! A minimal Redis client over a single persistent TCP connection. Only
//! the commands the cache needs are implemented: GET, SET, SETEX, plus
//! AUTH and SELECT for the connection-time handshake.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::backend::CacheBackend;
use crate::error::{CacheError, Result};
use crate::redis::resp::{encode_command, read_reply, Reply};

// == Redis Config ==
/// Connection parameters for the Redis backend.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Server address (e.g., "127.0.0.1:6379")
    pub addr: String,
    /// Optional AUTH credential
    pub password: Option<String>,
    /// Database index; 0 skips the SELECT handshake step
    pub db: u32,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            password: None,
            db: 0,
        }
    }
}

// == Connection ==
/// The single owned transport handle: buffered read half plus write half.
struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    /// Sends one command and reads exactly one reply.
    ///
    /// Callers must hold the client's exclusion lock for the whole
    /// round trip: the protocol has no request identifiers, so a second
    /// command must never interleave with another's reply bytes.
    async fn command(&mut self, args: &[&[u8]]) -> Result<Reply> {
        self.writer.write_all(&encode_command(args)).await?;
        self.writer.flush().await?;
        read_reply(&mut self.reader).await
    }
}

// == Redis Cache ==
/// Redis-backed cache over one shared connection.
///
/// Every operation wraps its write-then-read sequence in a mutex, so at
/// most one command is in flight at a time (no pipelining). There is no
/// client-side timeout and no reconnect: a broken connection errors on
/// every subsequent call until the client is reconstructed.
pub struct RedisCache {
    conn: Mutex<Option<Connection>>,
}

impl RedisCache {
    // == Constructor ==
    /// Opens the connection and performs the handshake.
    ///
    /// If a password is configured, AUTH must succeed before anything
    /// else; a rejected credential surfaces as [`CacheError::Auth`]
    /// wrapping the peer's error text. If a non-zero database index is
    /// configured, SELECT must succeed. Failure at either step aborts
    /// construction and drops the socket.
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let stream = TcpStream::connect(&config.addr).await?;
        let (read_half, write_half) = stream.into_split();
        let mut conn = Connection {
            reader: BufReader::new(read_half),
            writer: write_half,
        };

        if let Some(password) = &config.password {
            match conn.command(&[b"AUTH", password.as_bytes()]).await {
                Ok(_) => {}
                Err(CacheError::Protocol(msg)) => return Err(CacheError::Auth(msg)),
                Err(e) => return Err(e),
            }
        }

        if config.db != 0 {
            conn.command(&[b"SELECT", config.db.to_string().as_bytes()])
                .await?;
        }

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    // == Close ==
    /// Shuts down the socket and releases the connection.
    ///
    /// Safe to call once; a second close is a no-op. Operations after
    /// close fail with a connection error.
    pub async fn close(&self) -> Result<()> {
        if let Some(mut conn) = self.conn.lock().await.take() {
            conn.writer.shutdown().await?;
        }
        Ok(())
    }

    /// Runs one command/reply round trip under the exclusion lock.
    async fn round_trip(&self, args: &[&[u8]]) -> Result<Reply> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(|| {
            CacheError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "client is closed",
            ))
        })?;
        conn.command(args).await
    }
}

// == Cache Backend Implementation ==
#[async_trait]
impl CacheBackend for RedisCache {
    /// Sends `GET key` and reads one reply.
    ///
    /// A null bulk reply is the miss signal; any other reply maps to its
    /// byte form (bulk payload verbatim, simple strings and integers as
    /// their text).
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.round_trip(&[b"GET", key.as_bytes()]).await? {
            Reply::Null => Ok(None),
            Reply::Bulk(bytes) => Ok(Some(bytes)),
            Reply::Simple(text) => Ok(Some(text.into_bytes())),
            Reply::Integer(value) => Ok(Some(value.to_string().into_bytes())),
        }
    }

    /// Serializes `value` and stores it, with expiry when `ttl > 0`.
    ///
    /// A zero TTL issues `SET` (no expiry); otherwise `SETEX` with the
    /// TTL in whole seconds. Sub-second TTLs truncate toward zero
    /// seconds -- a known coarsening of the intended expiry.
    async fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let payload = serde_json::to_vec(value)?;

        if ttl.is_zero() {
            self.round_trip(&[b"SET", key.as_bytes(), &payload]).await?;
        } else {
            let secs = ttl.as_secs().to_string();
            self.round_trip(&[b"SETEX", key.as_bytes(), secs.as_bytes(), &payload])
                .await?;
        }

        Ok(())
    }
}
