//! Cache-aside coordination: look up, fall back to computing, write back.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Cache, CacheError};

/// How a response was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a cached entry.
    Hit,
    /// Computed because no usable entry existed.
    Miss,
    /// Computed because the caller asked to skip the lookup.
    Bypass,
}

impl CacheStatus {
    /// Value reported in the `X-Cache` response header.
    #[must_use]
    pub const fn as_header_value(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypass => "BYPASS",
        }
    }
}

/// A value together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub status: CacheStatus,
}

/// Wraps a [`Cache`] with a TTL and a per-operation timeout, and degrades
/// every cache failure to a miss.
#[derive(Clone)]
pub struct CacheAside {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    op_timeout: Duration,
}

impl CacheAside {
    #[must_use]
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration, op_timeout: Duration) -> Self {
        Self {
            cache,
            ttl,
            op_timeout,
        }
    }

    /// Returns the cached value for `key`, or computes it and writes it
    /// back.
    ///
    /// With `bypass` set the lookup is skipped but the fresh value is
    /// still written, refreshing the entry. Cache read and write failures
    /// are logged and never reach the caller. Failed computations are not
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns whatever `compute` returns on failure.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        bypass: bool,
        compute: F,
    ) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let status = if bypass {
            log::debug!("Cache BYPASS: {key}");
            CacheStatus::Bypass
        } else if let Some(value) = self.lookup(key).await {
            log::debug!("Cache HIT: {key}");
            return Ok(Cached {
                value,
                status: CacheStatus::Hit,
            });
        } else {
            log::debug!("Cache MISS: {key}");
            CacheStatus::Miss
        };

        let value = compute().await?;
        self.store(key, &value).await;

        Ok(Cached { value, status })
    }

    /// Whether the backing cache currently answers a ping.
    pub async fn is_available(&self) -> bool {
        match self.bounded(self.cache.ping()).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Cache ping failed: {e}");
                false
            }
        }
    }

    /// Releases the backing cache's connections.
    pub async fn close(&self) {
        self.cache.close().await;
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.bounded(self.cache.get(key)).await {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Cache read failed for {key}: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding undecodable cache entry {key}: {e}");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Could not serialize cache entry {key}: {e}");
                return;
            }
        };

        let write = self.cache.set_with_ttl(key, self.ttl.as_secs(), &raw);
        if let Err(e) = self.bounded(write).await {
            log::warn!("Cache write failed for {key}: {e}");
        }
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| CacheError::Timeout {
                after: self.op_timeout,
            })?
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::MemoryCache;

    struct FailingCache;

    #[async_trait]
    impl Cache for FailingCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn set_with_ttl(&self, _: &str, _: u64, _: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn ping(&self) -> Result<(), CacheError> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }
    }

    struct StalledCache;

    #[async_trait]
    impl Cache for StalledCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }

        async fn set_with_ttl(&self, _: &str, _: u64, _: &str) -> Result<(), CacheError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        async fn ping(&self) -> Result<(), CacheError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn aside(cache: Arc<dyn Cache>) -> CacheAside {
        CacheAside::new(cache, Duration::from_secs(300), Duration::from_millis(250))
    }

    async fn counted(calls: &AtomicUsize, value: u32) -> Result<u32, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let memory = Arc::new(MemoryCache::new());
        let aside = aside(memory.clone());
        let calls = AtomicUsize::new(0);

        let first = aside
            .get_or_compute("k", false, || counted(&calls, 7))
            .await
            .unwrap();
        assert_eq!(first, Cached { value: 7, status: CacheStatus::Miss });

        let second = aside
            .get_or_compute("k", false, || counted(&calls, 8))
            .await
            .unwrap();
        assert_eq!(second, Cached { value: 7, status: CacheStatus::Hit });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memory.get("k").await.unwrap().as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn bypass_recomputes_and_refreshes() {
        let memory = Arc::new(MemoryCache::new());
        memory.set_with_ttl("k", 300, "1").await.unwrap();
        let aside = aside(memory.clone());
        let calls = AtomicUsize::new(0);

        let result = aside
            .get_or_compute("k", true, || counted(&calls, 2))
            .await
            .unwrap();
        assert_eq!(result, Cached { value: 2, status: CacheStatus::Bypass });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memory.get("k").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn failing_cache_degrades_to_miss() {
        let aside = aside(Arc::new(FailingCache));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result = aside
                .get_or_compute("k", false, || counted(&calls, 3))
                .await
                .unwrap();
            assert_eq!(result, Cached { value: 3, status: CacheStatus::Miss });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!aside.is_available().await);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_cache_times_out() {
        let aside = aside(Arc::new(StalledCache));
        let calls = AtomicUsize::new(0);

        let result = aside
            .get_or_compute("k", false, || counted(&calls, 4))
            .await
            .unwrap();
        assert_eq!(result, Cached { value: 4, status: CacheStatus::Miss });
        assert!(!aside.is_available().await);
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss() {
        let memory = Arc::new(MemoryCache::new());
        memory.set_with_ttl("k", 300, "{not json").await.unwrap();
        let aside = aside(memory.clone());
        let calls = AtomicUsize::new(0);

        let result = aside
            .get_or_compute("k", false, || counted(&calls, 5))
            .await
            .unwrap();
        assert_eq!(result.status, CacheStatus::Miss);
        assert_eq!(memory.get("k").await.unwrap().as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn failed_computation_is_not_cached() {
        let memory = Arc::new(MemoryCache::new());
        let aside = aside(memory.clone());

        let result: Result<Cached<u32>, String> = aside
            .get_or_compute("k", false, || async { Err("store down".to_string()) })
            .await;
        assert_eq!(result.unwrap_err(), "store down");
        assert_eq!(memory.get("k").await.unwrap(), None);
        assert!(aside.is_available().await);
    }

    #[test]
    fn header_values() {
        assert_eq!(CacheStatus::Hit.as_header_value(), "HIT");
        assert_eq!(CacheStatus::Miss.as_header_value(), "MISS");
        assert_eq!(CacheStatus::Bypass.as_header_value(), "BYPASS");
    }
}
