#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feature, weight and score explanation types for location scoring.
//!
//! The set of scorable features is closed: [`Feature`] enumerates them in
//! catalog order, and every map keyed by a feature iterates in that order.

use std::collections::BTreeMap;

use locofinder_location_models::LocationRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A numeric location attribute that can take part in weighted scoring.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    /// Median household income.
    MedianIncome,
    /// Crime index.
    CrimeIndex,
    /// Growth index.
    GrowthIndex,
    /// Median home price.
    HomePrice,
    /// Median monthly rent.
    RentPrice,
}

impl Feature {
    /// Returns all features in catalog order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::MedianIncome,
            Self::CrimeIndex,
            Self::GrowthIndex,
            Self::HomePrice,
            Self::RentPrice,
        ]
    }

    /// Returns the raw value of this feature on `record`.
    #[must_use]
    pub const fn value_of(self, record: &LocationRecord) -> f64 {
        match self {
            Self::MedianIncome => record.median_income,
            Self::CrimeIndex => record.crime_index,
            Self::GrowthIndex => record.growth_index,
            Self::HomePrice => record.home_price,
            Self::RentPrice => record.rent_price,
        }
    }
}

/// Whether higher or lower raw values are preferable for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OptimizationDirection {
    /// Higher raw values score higher.
    Maximize,
    /// Lower raw values score higher.
    Minimize,
}

impl OptimizationDirection {
    /// Returns `true` for [`Self::Minimize`].
    #[must_use]
    pub const fn is_minimize(self) -> bool {
        matches!(self, Self::Minimize)
    }
}

/// Observed `{min, max}` of a feature over a cohort.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
}

impl FeatureRange {
    /// Range used when statistics for a feature are unavailable.
    pub const FALLBACK: Self = Self { min: 0.0, max: 1.0 };

    /// Creates a new range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Per-feature ranges over a cohort of locations.
pub type FeatureStats = BTreeMap<Feature, FeatureRange>;

/// User-supplied importance of each feature.
///
/// A weight of exactly `0.0` excludes the feature from scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringWeights {
    /// Weight for high median income.
    pub median_income: f64,
    /// Weight for a low crime index.
    pub crime_index: f64,
    /// Weight for a high growth index.
    pub growth_index: f64,
    /// Weight for a low home price.
    pub home_price: f64,
    /// Weight for a low rent.
    pub rent_price: f64,
}

impl ScoringWeights {
    /// Returns the weight assigned to `feature`.
    #[must_use]
    pub const fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::MedianIncome => self.median_income,
            Feature::CrimeIndex => self.crime_index,
            Feature::GrowthIndex => self.growth_index,
            Feature::HomePrice => self.home_price,
            Feature::RentPrice => self.rent_price,
        }
    }

    /// Returns `true` if every weight is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        Feature::all().iter().all(|f| self.get(*f).is_finite())
    }
}

/// How a single feature contributed to a location's total score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplainedScore {
    /// Raw feature value from the record.
    pub base_value: f64,
    /// Value after normalization.
    pub normalized_value: f64,
    /// Weight applied.
    pub weight: f64,
    /// `normalized_value * weight`.
    pub contribution: f64,
}

/// A location decorated with its total score and per-feature breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLocation {
    /// The scored record, unchanged.
    pub location: LocationRecord,
    /// Sum of all contributions.
    pub total_score: f64,
    /// Breakdown for every feature with a non-zero weight.
    pub features: BTreeMap<Feature, ExplainedScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_names_are_snake_case() {
        assert_eq!(Feature::MedianIncome.to_string(), "median_income");
        assert_eq!("rent_price".parse::<Feature>().unwrap(), Feature::RentPrice);
        assert_eq!(
            serde_json::to_string(&Feature::CrimeIndex).unwrap(),
            r#""crime_index""#
        );
    }

    #[test]
    fn weights_default_to_zero() {
        let weights: ScoringWeights = serde_json::from_str(r#"{"home_price":2.5}"#).unwrap();
        assert!((weights.get(Feature::HomePrice) - 2.5).abs() < f64::EPSILON);
        for feature in Feature::all() {
            if *feature != Feature::HomePrice {
                assert!(weights.get(*feature).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn weights_reject_unknown_and_non_numeric_fields() {
        assert!(serde_json::from_str::<ScoringWeights>(r#"{"walkability":1.0}"#).is_err());
        assert!(serde_json::from_str::<ScoringWeights>(r#"{"crime_index":"high"}"#).is_err());
    }

    #[test]
    fn direction_renders_as_lowercase_word() {
        assert_eq!(OptimizationDirection::Minimize.to_string(), "minimize");
        assert_eq!(OptimizationDirection::Maximize.as_ref(), "maximize");
    }

    #[test]
    fn explanation_map_serializes_with_feature_names() {
        let mut features = BTreeMap::new();
        features.insert(
            Feature::GrowthIndex,
            ExplainedScore {
                base_value: 5.0,
                normalized_value: 0.5,
                weight: 2.0,
                contribution: 1.0,
            },
        );
        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(json["growth_index"]["contribution"], 1.0);
    }
}
