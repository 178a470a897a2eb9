//! Deterministic cache-key derivation.
//!
//! Keys depend only on the request inputs, so identical requests map to
//! the same entry across workers and across restarts.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::CacheError;

/// Prefix for paginated search results.
pub const SEARCH_PREFIX: &str = "locations_search";

/// Prefix for ranked recommendations.
pub const RECOMMEND_PREFIX: &str = "recommend";

/// Builds the key for a search page.
///
/// The pagination suffix always comes last, so the state value can be
/// recovered unambiguously from any key.
#[must_use]
pub fn search_key(state: Option<&str>, offset: u32, limit: u32) -> String {
    format!(
        "{SEARCH_PREFIX}:state={}:offset={offset}:limit={limit}",
        state.unwrap_or_default()
    )
}

/// Builds the key for a recommendation request: the SHA-256 of the
/// request's canonical JSON (object keys sorted).
///
/// # Errors
///
/// Returns [`CacheError::Serialization`] if `request` cannot be serialized.
pub fn recommend_key<T: Serialize>(request: &T) -> Result<String, CacheError> {
    hashed_key(RECOMMEND_PREFIX, request)
}

/// Builds `"{prefix}:{sha256 hex}"` over the canonical JSON of `value`.
///
/// # Errors
///
/// Returns [`CacheError::Serialization`] if `value` cannot be serialized.
pub fn hashed_key<T: Serialize>(prefix: &str, value: &T) -> Result<String, CacheError> {
    // `Value` objects are backed by an ordered map, so re-serializing one
    // emits keys in sorted order regardless of struct field order.
    let canonical = serde_json::to_value(value)?.to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(format!("{prefix}:{}", hex::encode(digest)))
}
