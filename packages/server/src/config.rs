//! Server configuration.
//!
//! Values are resolved in order of increasing precedence: built-in
//! defaults, an optional TOML file, environment variables, then CLI flags
//! (applied by the binary via [`ServerConfig::apply_overrides`]).

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "LOCOFINDER_CONFIG";

/// `redis_url` value that selects the in-process cache.
pub const MEMORY_CACHE_URL: &str = "memory";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ServerConfig`].
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// An environment variable holds a value of the wrong type.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    /// A setting is outside its allowed range.
    #[error("Invalid setting {key}: {message}")]
    Invalid {
        key: &'static str,
        message: &'static str,
    },
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Dataset file: `.duckdb`, `.db`, `.parquet` or `.csv`.
    pub data_path: PathBuf,
    /// Redis URL, or [`MEMORY_CACHE_URL`].
    pub redis_url: String,
    pub pool_size: usize,
    pub cache_ttl_seconds: u64,
    pub cache_timeout_ms: u64,
    pub query_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8000,
            data_path: locofinder_database::paths::default_dataset_path(),
            redis_url: "redis://localhost:6379".to_string(),
            pool_size: 4,
            cache_ttl_seconds: locofinder_cache::DEFAULT_TTL.as_secs(),
            cache_timeout_ms: 250,
            query_timeout_ms: 10_000,
        }
    }
}

/// Settings given on the command line. `None` leaves the loaded value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub data_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Loads configuration from the process environment, reading the TOML
    /// file at `file` (or `LOCOFINDER_CONFIG`) first if one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// any value is invalid.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let file = file.map(Path::to_path_buf).or(from_env);
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Builds configuration from an optional TOML file and an environment
    /// lookup function.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// any value is invalid.
    pub fn from_sources(
        file: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = env("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = env("LOCOFINDER_DATA_PATH") {
            self.data_path = PathBuf::from(v);
        }
        if let Some(v) = env("REDIS_URL") {
            self.redis_url = v;
        }
        parse_env(&env, "PORT", &mut self.port)?;
        parse_env(&env, "LOCOFINDER_POOL_SIZE", &mut self.pool_size)?;
        parse_env(&env, "LOCOFINDER_CACHE_TTL", &mut self.cache_ttl_seconds)?;
        parse_env(&env, "LOCOFINDER_CACHE_TIMEOUT_MS", &mut self.cache_timeout_ms)?;
        parse_env(&env, "LOCOFINDER_QUERY_TIMEOUT_MS", &mut self.query_timeout_ms)?;
        Ok(())
    }

    /// Applies command-line overrides, which take precedence over both the
    /// file and the environment.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(bind_addr) = overrides.bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(data_path) = overrides.data_path {
            self.data_path = data_path;
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first out-of-range value.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::Invalid {
                key: "pool_size",
                message: "must be at least 1",
            });
        }
        if self.cache_ttl_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "cache_ttl_seconds",
                message: "must be at least 1",
            });
        }
        if self.cache_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "cache_timeout_ms",
                message: "must be at least 1",
            });
        }
        if self.query_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "query_timeout_ms",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn uses_memory_cache(&self) -> bool {
        self.redis_url.eq_ignore_ascii_case(MEMORY_CACHE_URL)
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    #[must_use]
    pub const fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

fn parse_env<T: FromStr>(
    env: impl Fn(&str) -> Option<String>,
    key: &'static str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(value) = env(key) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { key, value })?;
    }
    Ok(())
}
