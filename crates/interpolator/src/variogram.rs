//! Spherical variogram model.

use serde::{Deserialize, Serialize};

/// Parameters of the spherical variogram, in pixel units.
///
/// `nugget` is the measurement noise floor, `sill` the correlation-loss
/// plateau, and `range` the distance beyond which points are uncorrelated.
/// Set once before use; only the kriging solver calls this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariogramParams {
    /// Decorrelation distance in pixels.
    pub range: f64,
    /// Semivariance plateau above the nugget.
    pub sill: f64,
    /// Semivariance at the origin.
    pub nugget: f64,
}

impl Default for VariogramParams {
    fn default() -> Self {
        Self {
            range: 20.0,
            sill: 1.0,
            nugget: 0.0,
        }
    }
}

impl VariogramParams {
    /// Semivariance as a function of unsigned distance.
    ///
    /// Piecewise: `nugget` below one pixel (the self-distance case),
    /// `nugget + sill` beyond the range, spherical in between. Monotone
    /// non-decreasing and continuous at the range boundary.
    pub fn semivariance(&self, distance: f64) -> f64 {
        let d = distance.abs();
        if d < 1.0 {
            return self.nugget;
        }
        if d > self.range {
            return self.nugget + self.sill;
        }
        let r = d / self.range;
        self.nugget + self.sill * (1.5 * r - 0.5 * r * r * r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> VariogramParams {
        VariogramParams {
            range: 10.0,
            sill: 2.0,
            nugget: 0.5,
        }
    }

    #[test]
    fn test_self_distance_is_nugget() {
        let v = params();
        assert_eq!(v.semivariance(0.0), 0.5);
        assert_eq!(v.semivariance(0.99), 0.5);
    }

    #[test]
    fn test_beyond_range_is_sill() {
        let v = params();
        assert_eq!(v.semivariance(10.1), 2.5);
        assert_eq!(v.semivariance(1e6), 2.5);
    }

    #[test]
    fn test_continuous_at_range() {
        let v = params();
        let below = v.semivariance(10.0 - 1e-9);
        let above = v.semivariance(10.0 + 1e-9);
        assert!(
            (below - above).abs() < 1e-6,
            "discontinuity at range: {} vs {}",
            below,
            above
        );
    }

    #[test]
    fn test_monotone_nondecreasing() {
        let v = params();
        let mut prev = v.semivariance(0.0);
        for i in 1..=1200 {
            let d = i as f64 * 0.01;
            let s = v.semivariance(d);
            assert!(s + 1e-12 >= prev, "decreasing at d={}: {} < {}", d, s, prev);
            prev = s;
        }
    }
}
