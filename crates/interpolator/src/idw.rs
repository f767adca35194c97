//! Inverse-distance-weighted estimation.

use cml_common::Observation;

/// Squared distance below which a target counts as coincident with an
/// observation.
const COINCIDENT_D2: f64 = 1e-12;

/// Estimate the value at a target point by squared-inverse-distance
/// weighting over the local observation set.
///
/// A target coincident with an observation returns that observation's
/// value directly (the average, if several observations coincide) rather
/// than propagating an infinity. The caller guarantees `observations` is
/// non-empty.
pub fn interpolate(target_x: f64, target_y: f64, observations: &[Observation]) -> f64 {
    let mut coincident_sum = 0.0;
    let mut coincident_count = 0usize;
    let mut weight_sum = 0.0;
    let mut weighted_value = 0.0;

    for obs in observations {
        let dx = obs.x - target_x;
        let dy = obs.y - target_y;
        let d2 = dx * dx + dy * dy;

        if d2 < COINCIDENT_D2 {
            coincident_sum += obs.value;
            coincident_count += 1;
            continue;
        }

        let w = 1.0 / d2;
        weight_sum += w;
        weighted_value += w * obs.value;
    }

    if coincident_count > 0 {
        return coincident_sum / coincident_count as f64;
    }

    weighted_value / weight_sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_observation_returns_its_value() {
        let obs = vec![Observation::new(7.25, 100.0, 100.0)];
        let est = interpolate(0.0, 0.0, &obs);
        assert_eq!(est, 7.25);
    }

    #[test]
    fn test_coincident_target_returns_observation_value() {
        let obs = vec![
            Observation::new(0.0, 0.0, 0.0),
            Observation::new(10.0, 9.0, 9.0),
        ];
        let est = interpolate(9.0, 9.0, &obs);
        assert_eq!(est, 10.0);
    }

    #[test]
    fn test_multiple_coincident_observations_averaged() {
        let obs = vec![
            Observation::new(2.0, 5.0, 5.0),
            Observation::new(4.0, 5.0, 5.0),
            Observation::new(100.0, 1.0, 1.0),
        ];
        let est = interpolate(5.0, 5.0, &obs);
        assert!((est - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_midpoint_of_equal_distances_is_mean() {
        let obs = vec![
            Observation::new(0.0, 0.0, 0.0),
            Observation::new(10.0, 10.0, 0.0),
        ];
        let est = interpolate(5.0, 0.0, &obs);
        assert!((est - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_closer_observation_dominates() {
        let obs = vec![
            Observation::new(0.0, 0.0, 0.0),
            Observation::new(10.0, 10.0, 0.0),
        ];
        let est = interpolate(8.0, 0.0, &obs);
        assert!(est > 5.0, "estimate {} should lean towards the nearer value", est);
    }
}
