#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the Locofinder server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the scoring types to allow independent evolution of the API
//! contract.

use std::collections::BTreeMap;

use locofinder_location_models::{LocationFilter, LocationRecord};
use locofinder_scoring_models::{
    ExplainedScore, Feature, OptimizationDirection, ScoredLocation, ScoringWeights,
};
use serde::{Deserialize, Serialize};

/// Page size used when the request does not specify one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page or result count a client may request.
pub const MAX_LIMIT: u32 = 100;

const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// A request that failed boundary validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("limit must be between 1 and {MAX_LIMIT}, got {0}")]
    LimitOutOfRange(u32),

    #[error("weight for {0} must be a finite number")]
    NonFiniteWeight(Feature),
}

/// Checks that `limit` is within `1..=MAX_LIMIT`.
///
/// # Errors
///
/// Returns [`ValidationError::LimitOutOfRange`] otherwise.
pub const fn validate_limit(limit: u32) -> Result<u32, ValidationError> {
    if limit >= 1 && limit <= MAX_LIMIT {
        Ok(limit)
    } else {
        Err(ValidationError::LimitOutOfRange(limit))
    }
}

/// Query parameters for `GET /locations/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    /// Exact state abbreviation to match.
    pub state: Option<String>,
    /// Number of matches to skip.
    #[serde(default)]
    pub offset: u32,
    /// Maximum number of locations to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl SearchParams {
    /// Validates pagination bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `limit` is out of range.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        match validate_limit(self.limit) {
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// The state filter, treating an empty or blank value as absent.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Converts the parameters into a record filter.
    #[must_use]
    pub fn filter(&self) -> LocationFilter {
        LocationFilter::by_state(self.state().map(ToString::to_string))
    }
}

/// Response body for `GET /locations/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Number of locations matching the filter, ignoring pagination.
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
    pub locations: Vec<LocationRecord>,
}

/// Request body for `POST /recommend` and `POST /scoring/explain/{id}`.
///
/// Explain only uses `weights`; the other fields are accepted so the same
/// payload can be sent to both endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub weights: ScoringWeights,
    #[serde(default)]
    pub filters: LocationFilter,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl ScoringRequest {
    /// Validates the result limit and the weights.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_limit(self.limit)?;
        self.validate_weights()
    }

    /// Validates only the weights.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFiniteWeight`] for the first weight
    /// that is NaN or infinite.
    pub fn validate_weights(&self) -> Result<(), ValidationError> {
        match Feature::all()
            .iter()
            .find(|f| !self.weights.get(**f).is_finite())
        {
            Some(feature) => Err(ValidationError::NonFiniteWeight(*feature)),
            None => Ok(()),
        }
    }
}

/// One entry in a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLocation {
    pub location: LocationRecord,
    pub total_score: f64,
}

impl From<ScoredLocation> for RankedLocation {
    fn from(scored: ScoredLocation) -> Self {
        Self {
            location: scored.location,
            total_score: scored.total_score,
        }
    }
}

/// Response body for `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    /// Size of the filtered cohort that was scored.
    pub total_analyzed: u64,
    /// Best-scoring locations, highest first.
    pub results: Vec<RankedLocation>,
}

impl RecommendResponse {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_analyzed: 0,
            results: Vec::new(),
        }
    }
}

/// Response body for `POST /scoring/explain/{location_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub location_id: String,
    pub total_score: f64,
    /// Per-feature breakdown; features with zero weight are absent.
    pub features: BTreeMap<Feature, ExplainedScore>,
}

impl From<ScoredLocation> for ExplainResponse {
    fn from(scored: ScoredLocation) -> Self {
        Self {
            location_id: scored.location.location_id,
            total_score: scored.total_score,
            features: scored.features,
        }
    }
}

/// One entry of `GET /scoring/schema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub feature_name: Feature,
    pub description: String,
    pub min_value: f64,
    pub max_value: f64,
    pub optimization_direction: OptimizationDirection,
}

/// Cache backend reachability as reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheConnection {
    Connected,
    Disconnected,
}

impl From<bool> for CacheConnection {
    fn from(available: bool) -> Self {
        if available {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub redis: CacheConnection,
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
