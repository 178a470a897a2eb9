#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feature normalization and weighted ranking of locations.
//!
//! Raw feature values live on very different scales (dollars, index
//! points, percentages), so each one is first mapped onto `[0, 1]` using
//! the `{min, max}` of the cohort being ranked, flipped for features where
//! lower is better, then multiplied by the user's weight. The sum of the
//! weighted values is the location's score.

pub mod catalog;
pub mod engine;
pub mod normalize;

pub use catalog::{FeatureDescriptor, SCORABLE_FEATURES};
pub use engine::{score_location, score_locations};
