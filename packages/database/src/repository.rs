//! The async record source and statistics provider consumed by the server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use duckdb::Connection;
use locofinder_location_models::{LocationFilter, LocationPage, LocationRecord};
use locofinder_scoring_models::FeatureStats;

use crate::{DbError, DuckDbPool, queries};

/// Read access to the location dataset.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Returns one page of locations matching `filter` plus the total
    /// number of matches.
    async fn fetch_page(
        &self,
        filter: &LocationFilter,
        offset: u32,
        limit: u32,
    ) -> Result<LocationPage, DbError>;

    /// Returns every location matching `filter`.
    async fn fetch_filtered(&self, filter: &LocationFilter)
    -> Result<Vec<LocationRecord>, DbError>;

    /// Returns the location with the given identifier, if any.
    async fn find_by_id(&self, location_id: &str) -> Result<Option<LocationRecord>, DbError>;

    /// Returns per-feature `{min, max}` over the locations matching
    /// `filter`, or over the whole dataset when `filter` is `None`.
    async fn feature_ranges(
        &self,
        filter: Option<&LocationFilter>,
    ) -> Result<FeatureStats, DbError>;
}

/// [`LocationRepository`] backed by a [`DuckDbPool`].
///
/// Each call takes one pooled connection on the blocking thread pool and
/// gives up after `query_timeout`.
pub struct DuckDbLocationRepository {
    pool: Arc<DuckDbPool>,
    query_timeout: Duration,
}

impl DuckDbLocationRepository {
    /// Creates a repository over `pool`.
    #[must_use]
    pub const fn new(pool: Arc<DuckDbPool>, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn run<T, F>(&self, query: F) -> Result<T, DbError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DbError> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        let task = tokio::task::spawn_blocking(move || {
            let conn = pool.acquire()?;
            query(&conn)
        });

        match tokio::time::timeout(self.query_timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(DbError::Timeout {
                after: self.query_timeout,
            }),
        }
    }
}

#[async_trait]
impl LocationRepository for DuckDbLocationRepository {
    async fn fetch_page(
        &self,
        filter: &LocationFilter,
        offset: u32,
        limit: u32,
    ) -> Result<LocationPage, DbError> {
        let filter = filter.clone();
        self.run(move |conn| queries::fetch_page(conn, &filter, offset, limit))
            .await
    }

    async fn fetch_filtered(
        &self,
        filter: &LocationFilter,
    ) -> Result<Vec<LocationRecord>, DbError> {
        let filter = filter.clone();
        self.run(move |conn| queries::fetch_filtered(conn, &filter))
            .await
    }

    async fn find_by_id(&self, location_id: &str) -> Result<Option<LocationRecord>, DbError> {
        let location_id = location_id.to_string();
        self.run(move |conn| queries::find_by_id(conn, &location_id))
            .await
    }

    async fn feature_ranges(
        &self,
        filter: Option<&LocationFilter>,
    ) -> Result<FeatureStats, DbError> {
        let filter = filter.cloned();
        self.run(move |conn| queries::feature_ranges(conn, filter.as_ref()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::tests::seeded_connection;
    use locofinder_scoring_models::{Feature, FeatureRange};

    fn repository() -> DuckDbLocationRepository {
        let pool = DuckDbPool::from_connection(seeded_connection(), 2).unwrap();
        DuckDbLocationRepository::new(Arc::new(pool), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn pages_through_the_blocking_pool() {
        let repo = repository();
        let page = repo
            .fetch_page(&LocationFilter::default(), 1, 1)
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.locations[0].location_id, "LOC-002");
    }

    #[tokio::test]
    async fn cohort_ranges_follow_the_filter() {
        let repo = repository();
        let filter = LocationFilter {
            max_home_price: Some(500_000.0),
            ..LocationFilter::default()
        };

        let cohort = repo.fetch_filtered(&filter).await.unwrap();
        assert_eq!(cohort.len(), 2);

        let stats = repo.feature_ranges(Some(&filter)).await.unwrap();
        assert_eq!(
            stats[&Feature::HomePrice],
            FeatureRange::new(400_000.0, 500_000.0)
        );
    }

    #[tokio::test]
    async fn concurrent_queries_use_separate_connections() {
        let repo = Arc::new(repository());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.fetch_filtered(&LocationFilter::default()).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().len(), 3);
        }
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let repo = repository();
        assert!(repo.find_by_id("nope").await.unwrap().is_none());
        assert_eq!(
            repo.find_by_id("LOC-003").await.unwrap().unwrap().state,
            "TX"
        );
    }
}
