//! Process-local cache with per-entry expiry.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{Cache, CacheError};

/// An in-memory [`Cache`].
///
/// An expired entry is dropped when it is read, and every write sweeps out
/// all expired entries, so keys that are never read again do not
/// accumulate. Useful when no Redis server is configured, and as a test
/// double.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<BTreeMap<String, (String, Instant)>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not yet expired.
    #[cfg(test)]
    fn live_entries(&self) -> Result<usize, CacheError> {
        let now = Instant::now();
        Ok(self
            .lock()?
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, (String, Instant)>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::Unavailable {
            message: "memory cache lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.lock()?;

        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        ttl_seconds: u64,
        value: &str,
    ) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.lock()?;

        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(
            key.to_string(),
            (value.to_string(), now + Duration::from_secs(ttl_seconds)),
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.lock().map(|_| ())
    }
}
