#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `DuckDB`-backed location record source and feature statistics.
//!
//! The dataset is exposed to SQL as a single `locations` relation: either a
//! table inside a `.duckdb` file or a view over a Parquet/CSV file. All
//! reads go through a small pool of connections and run on the blocking
//! thread pool, so request handlers never stall the async runtime. Filter
//! values are always bound as query parameters.

pub mod dataset;
pub mod paths;
pub mod pool;
pub mod queries;
pub mod repository;

use std::path::PathBuf;
use std::time::Duration;

pub use pool::DuckDbPool;
pub use repository::{DuckDbLocationRepository, LocationRepository};

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` query or connection error.
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    /// The dataset file has an extension we cannot load.
    #[error("Unsupported dataset format: {}", path.display())]
    UnsupportedDataset {
        /// Offending path.
        path: PathBuf,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// A query did not finish within the configured timeout.
    #[error("Query timed out after {after:?}")]
    Timeout {
        /// The timeout that elapsed.
        after: Duration,
    },

    /// The blocking query task panicked or was cancelled.
    #[error("Query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A pooled connection's mutex was poisoned by a panicking query.
    #[error("Connection pool poisoned")]
    PoolPoisoned,
}
