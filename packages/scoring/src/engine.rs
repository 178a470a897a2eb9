//! Weighted scoring and ranking.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use locofinder_location_models::LocationRecord;
use locofinder_scoring_models::{
    ExplainedScore, FeatureRange, FeatureStats, ScoredLocation, ScoringWeights,
};

use crate::catalog::SCORABLE_FEATURES;
use crate::normalize;

/// Scores a single record.
///
/// Features are visited in catalog order. A feature whose weight is exactly
/// zero is skipped entirely: it contributes nothing and gets no entry in the
/// explanation. A feature missing from `stats` is normalized against
/// [`FeatureRange::FALLBACK`].
#[must_use]
#[allow(clippy::float_cmp)]
pub fn score_location(
    location: LocationRecord,
    stats: &FeatureStats,
    weights: &ScoringWeights,
) -> ScoredLocation {
    let mut total_score = 0.0;
    let mut features = BTreeMap::new();

    for descriptor in SCORABLE_FEATURES {
        let weight = weights.get(descriptor.feature);
        if weight == 0.0 {
            continue;
        }

        let base_value = descriptor.feature.value_of(&location);
        let range = stats
            .get(&descriptor.feature)
            .copied()
            .unwrap_or(FeatureRange::FALLBACK);

        let normalized_value = normalize::min_max(
            base_value,
            range.min,
            range.max,
            descriptor.direction.is_minimize(),
        );
        let contribution = normalized_value * weight;
        total_score += contribution;

        features.insert(
            descriptor.feature,
            ExplainedScore {
                base_value,
                normalized_value,
                weight,
                contribution,
            },
        );
    }

    ScoredLocation {
        location,
        total_score,
        features,
    }
}

/// Scores every record and ranks them by descending total score.
///
/// The sort is stable: records with equal totals keep their input order.
/// The full ranking is returned; truncation is up to the caller.
#[must_use]
pub fn score_locations(
    locations: Vec<LocationRecord>,
    stats: &FeatureStats,
    weights: &ScoringWeights,
) -> Vec<ScoredLocation> {
    let mut scored: Vec<ScoredLocation> = locations
        .into_iter()
        .map(|location| score_location(location, stats, weights))
        .collect();

    rank(&mut scored);

    log::trace!("Scored and ranked {} locations", scored.len());

    scored
}

/// Sorts scored locations by descending total score, keeping input order on
/// ties.
pub fn rank(scored: &mut [ScoredLocation]) {
    scored.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(Ordering::Equal)
    });
}
