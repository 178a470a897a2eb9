//! The static registry of scorable features.

use locofinder_scoring_models::{Feature, OptimizationDirection};

/// A scorable feature and the direction in which it is optimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureDescriptor {
    /// Which feature.
    pub feature: Feature,
    /// Whether higher or lower raw values are preferable.
    pub direction: OptimizationDirection,
    /// Human-readable description for schema introspection.
    pub description: &'static str,
}

/// Every scorable feature, in the order the engine visits them.
pub const SCORABLE_FEATURES: &[FeatureDescriptor] = &[
    FeatureDescriptor {
        feature: Feature::MedianIncome,
        direction: OptimizationDirection::Maximize,
        description: "Median household income; higher is better",
    },
    FeatureDescriptor {
        feature: Feature::CrimeIndex,
        direction: OptimizationDirection::Minimize,
        description: "Crime index; lower is better",
    },
    FeatureDescriptor {
        feature: Feature::GrowthIndex,
        direction: OptimizationDirection::Maximize,
        description: "Population and economic growth index; higher is better",
    },
    FeatureDescriptor {
        feature: Feature::HomePrice,
        direction: OptimizationDirection::Minimize,
        description: "Median home price; lower is better",
    },
    FeatureDescriptor {
        feature: Feature::RentPrice,
        direction: OptimizationDirection::Minimize,
        description: "Median monthly rent; lower is better",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_feature_in_order() {
        let features: Vec<Feature> = SCORABLE_FEATURES.iter().map(|d| d.feature).collect();
        assert_eq!(features, Feature::all());
    }

    #[test]
    fn cost_and_crime_features_are_minimized() {
        let minimized: Vec<Feature> = SCORABLE_FEATURES
            .iter()
            .filter(|d| d.direction.is_minimize())
            .map(|d| d.feature)
            .collect();
        assert_eq!(
            minimized,
            [Feature::CrimeIndex, Feature::HomePrice, Feature::RentPrice]
        );
    }

    #[test]
    fn every_descriptor_has_a_description() {
        assert!(SCORABLE_FEATURES.iter().all(|d| !d.description.is_empty()));
    }
}
