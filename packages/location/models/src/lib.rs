#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location record and filter types.
//!
//! A [`LocationRecord`] is one row of the location dataset as read from the
//! analytical store. Records are immutable once fetched; scoring wraps them
//! rather than adding fields to them.

use serde::{Deserialize, Serialize};

/// A single location row from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Stable identifier (e.g. `LOC-000123`).
    pub location_id: String,
    /// City name.
    pub city: String,
    /// County name.
    pub county: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// Median household income in dollars.
    pub median_income: f64,
    /// Crime index (lower is safer).
    pub crime_index: f64,
    /// Growth index (higher is faster growing).
    pub growth_index: f64,
    /// Median home price in dollars.
    pub home_price: f64,
    /// Median monthly rent in dollars.
    pub rent_price: f64,
    /// Resident population.
    pub population: i64,
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lon: f64,
}

/// Hard constraints applied when fetching locations.
///
/// Every field is optional; an empty filter matches the whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationFilter {
    /// Exact state abbreviation match.
    pub state: Option<String>,
    /// Upper bound (inclusive) on `home_price`.
    pub max_home_price: Option<f64>,
    /// Upper bound (inclusive) on `rent_price`.
    pub max_rent_price: Option<f64>,
    /// Lower bound (inclusive) on `median_income`.
    pub min_income: Option<f64>,
}

impl LocationFilter {
    /// Creates a filter that only constrains the state.
    #[must_use]
    pub fn by_state(state: Option<String>) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Returns `true` if no constraint is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.max_home_price.is_none()
            && self.max_rent_price.is_none()
            && self.min_income.is_none()
    }

    /// Returns a copy with the constraints that cannot narrow anything
    /// removed: a blank `state` and any bound that is zero, negative or NaN.
    ///
    /// A present `state` is trimmed.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let positive = |bound: Option<f64>| bound.filter(|v| *v > 0.0);

        Self {
            state: self
                .state
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            max_home_price: positive(self.max_home_price),
            max_rent_price: positive(self.max_rent_price),
            min_income: positive(self.min_income),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPage {
    /// Records on this page.
    pub locations: Vec<LocationRecord>,
    /// Number of records matching the filter, ignoring pagination.
    pub total: u64,
}
