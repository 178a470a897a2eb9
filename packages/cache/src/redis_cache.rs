//! Redis-backed [`Cache`].

use async_trait::async_trait;
use redis::AsyncCommands as _;
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;

use crate::{Cache, CacheError};

/// A [`Cache`] stored in Redis.
///
/// The connection is established lazily on first use, so the service can
/// start while Redis is unreachable. Once connected, the
/// [`ConnectionManager`] reconnects on its own after transient failures.
pub struct RedisCache {
    client: redis::Client,
    manager: Mutex<Option<ConnectionManager>>,
}

impl RedisCache {
    /// Creates a client for `url` without connecting.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Redis`] if `url` is not a valid Redis URL.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            manager: Mutex::new(None),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let mut manager = self.manager.lock().await;

        if let Some(existing) = manager.as_ref() {
            return Ok(existing.clone());
        }

        let connected = ConnectionManager::new(self.client.clone()).await?;
        log::info!("Connected to Redis");
        *manager = Some(connected.clone());
        Ok(connected)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        ttl_seconds: u64,
        value: &str,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn close(&self) {
        if self.manager.lock().await.take().is_some() {
            log::info!("Closed Redis connection");
        }
    }
}
