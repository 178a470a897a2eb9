//! Normalization of raw feature values onto a common scale.

/// Min-max normalization.
///
/// Maps `value` to `(value - min) / (max - min)`, or to one minus that when
/// `minimize` is set so that lower raw values score closer to `1.0`.
///
/// A flat range (`min == max`) carries no information and yields `0.5`.
/// Values outside `[min, max]` are not clamped and produce results outside
/// `[0, 1]`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn min_max(value: f64, min: f64, max: f64, minimize: bool) -> f64 {
    if max == min {
        return 0.5;
    }

    let normalized = (value - min) / (max - min);
    if minimize { 1.0 - normalized } else { normalized }
}

/// Standard-score normalization squashed into `(0, 1)` with the logistic
/// function.
///
/// The sign of the standard score is flipped before squashing when
/// `minimize` is set. A zero standard deviation yields `0.5`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn z_score(value: f64, mean: f64, std_dev: f64, minimize: bool) -> f64 {
    if std_dev == 0.0 {
        return 0.5;
    }

    let z = (value - mean) / std_dev;
    sigmoid(if minimize { -z } else { z })
}

/// The logistic function `1 / (1 + e^-z)`.
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn min_max_endpoints() {
        assert!((min_max(0.0, 0.0, 100.0, false) - 0.0).abs() < EPS);
        assert!((min_max(100.0, 0.0, 100.0, false) - 1.0).abs() < EPS);
        assert!((min_max(50.0, 0.0, 100.0, false) - 0.5).abs() < EPS);
    }

    #[test]
    fn min_max_minimize_inverts() {
        assert!((min_max(0.0, 0.0, 100.0, true) - 1.0).abs() < EPS);
        assert!((min_max(100.0, 0.0, 100.0, true) - 0.0).abs() < EPS);
        assert!((min_max(75.0, 0.0, 100.0, true) - 0.25).abs() < EPS);
    }

    #[test]
    fn min_max_directions_sum_to_one() {
        let ranges = [(0.0, 1.0), (-5.0, 15.0), (500.0, 5_000.0), (30_000.0, 150_000.0)];
        for (min, max) in ranges {
            for step in 0..=10 {
                let value = min + (max - min) * f64::from(step) / 10.0;
                let sum = min_max(value, min, max, false) + min_max(value, min, max, true);
                assert!((sum - 1.0).abs() < 1e-9, "{value} in [{min}, {max}] summed to {sum}");
            }
        }
    }

    #[test]
    fn min_max_flat_range_is_midpoint() {
        for value in [-10.0, 0.0, 50.0, 1e9] {
            assert!((min_max(value, 50.0, 50.0, false) - 0.5).abs() < EPS);
            assert!((min_max(value, 50.0, 50.0, true) - 0.5).abs() < EPS);
        }
    }

    #[test]
    fn min_max_does_not_clamp() {
        assert!((min_max(150.0, 0.0, 100.0, false) - 1.5).abs() < EPS);
        assert!((min_max(-50.0, 0.0, 100.0, true) - 1.5).abs() < EPS);
    }

    #[test]
    fn z_score_at_mean_is_half() {
        assert!((z_score(100.0, 100.0, 10.0, false) - 0.5).abs() < EPS);
        assert!((z_score(100.0, 100.0, 10.0, true) - 0.5).abs() < EPS);
    }

    #[test]
    fn z_score_minimize_mirrors() {
        let high = z_score(120.0, 100.0, 10.0, false);
        let high_minimized = z_score(120.0, 100.0, 10.0, true);
        assert!(high > 0.5);
        assert!((high + high_minimized - 1.0).abs() < 1e-9);
    }

    #[test]
    fn z_score_zero_deviation_is_half() {
        assert!((z_score(42.0, 7.0, 0.0, false) - 0.5).abs() < EPS);
    }

    #[test]
    fn sigmoid_is_bounded() {
        assert!(sigmoid(-30.0) > 0.0);
        assert!(sigmoid(30.0) <= 1.0);
        assert!((sigmoid(0.0) - 0.5).abs() < EPS);
    }
}
