#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cache clients, cache-key derivation and cache-aside coordination.
//!
//! The cache is strictly a latency optimization. [`CacheAside`] turns
//! every cache failure (connection refused, timeout, undecodable entry)
//! into a miss and carries on computing the answer from the source of
//! truth, so a request never fails because the cache is down.

pub mod aside;
pub mod keys;
pub mod memory;
pub mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;

pub use aside::{CacheAside, CacheStatus, Cached};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Default time-to-live for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Errors reported by cache clients.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Redis command or connection failure.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A cache operation did not complete in time.
    #[error("Cache operation timed out after {after:?}")]
    Timeout {
        /// The timeout that elapsed.
        after: Duration,
    },

    /// A value could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The cache is unusable for some other reason.
    #[error("Cache unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}

/// A string key/value cache with per-entry expiry.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent or
    /// expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for `ttl_seconds`, replacing any
    /// existing entry.
    async fn set_with_ttl(&self, key: &str, ttl_seconds: u64, value: &str)
    -> Result<(), CacheError>;

    /// Checks that the cache backend is reachable.
    async fn ping(&self) -> Result<(), CacheError>;

    /// Releases any connections held by the client.
    async fn close(&self) {}
}
