#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for Locofinder.
//!
//! Serves paginated location search, weighted recommendations, score
//! explanations and the scoring schema from a read-only `DuckDB` view of
//! the location dataset. Search and recommend responses are cached in
//! Redis (or in process) for a few minutes; when the cache is unreachable
//! requests are answered straight from the dataset.

pub mod config;
pub mod error;
mod handlers;
pub mod interactive;

use std::sync::Arc;
use std::time::Instant;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use locofinder_cache::{Cache, CacheAside, CacheError, MemoryCache, RedisCache};
use locofinder_database::{DbError, DuckDbLocationRepository, DuckDbPool, LocationRepository};

pub use config::{ConfigError, Overrides, ServerConfig};
pub use error::ApiError;
pub use handlers::{BYPASS_HEADER, CACHE_STATUS_HEADER};

/// Shared application state, handed to every handler as `web::Data`.
pub struct AppState {
    /// Read access to the location dataset.
    pub repository: Arc<dyn LocationRepository>,
    /// Response cache.
    pub cache: CacheAside,
    /// When the state was built, for `/health` uptime.
    pub started_at: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(repository: Arc<dyn LocationRepository>, cache: CacheAside) -> Self {
        Self {
            repository,
            cache,
            started_at: Instant::now(),
        }
    }
}

/// Errors that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("HTTP server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registers the API routes and the extractor error handlers that turn
/// malformed JSON bodies and query strings into `400` responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .route("/locations/search", web::get().to(handlers::search))
    .route("/recommend", web::post().to(handlers::recommend))
    .route("/scoring/schema", web::get().to(handlers::schema))
    .route(
        "/scoring/explain/{location_id}",
        web::post().to(handlers::explain),
    )
    .route("/health", web::get().to(handlers::health));
}

fn build_cache(config: &ServerConfig) -> Result<Arc<dyn Cache>, CacheError> {
    if config.uses_memory_cache() {
        log::info!("Using in-process response cache");
        Ok(Arc::new(MemoryCache::new()))
    } else {
        log::info!("Using Redis response cache at {}", config.redis_url);
        Ok(Arc::new(RedisCache::new(&config.redis_url)?))
    }
}

/// Starts the Locofinder API server and blocks until it shuts down.
///
/// Opens the dataset, constructs the cache client and serves until the
/// process receives SIGINT or SIGTERM, then closes the cache client. This
/// is a regular async function; the caller is responsible for providing
/// the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`StartupError`] if the dataset cannot be opened, the cache URL
/// is invalid, or the HTTP server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), StartupError> {
    log::info!("Opening dataset {}...", config.data_path.display());
    let pool = DuckDbPool::open(&config.data_path, config.pool_size)?;
    log::info!("Dataset ready with {} pooled connections", pool.size());
    let repository = DuckDbLocationRepository::new(Arc::new(pool), config.query_timeout());

    let cache = CacheAside::new(
        build_cache(&config)?,
        config.cache_ttl(),
        config.cache_timeout(),
    );

    let state = web::Data::new(AppState::new(Arc::new(repository), cache));

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    let app_state = state.clone();
    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    state.cache.close().await;
    log::info!("Server stopped");

    Ok(())
}
