//! Ordinary kriging solver.
//!
//! For n local observations the solver builds an (n+1) x (n+1) symmetric
//! system: pairwise semivariances in the top-left block, a Lagrange
//! row/column of ones enforcing that the data weights sum to 1, and a zero
//! in the corner. The matrix is symmetric indefinite (the Lagrange row
//! breaks positive-definiteness), so it is factored with full-pivot LU.
//! The factorization is reused for every pixel of a tile; only the
//! right-hand side changes.

use cml_common::Observation;
use nalgebra::{DMatrix, DVector};

use crate::error::{InterpolationError, Result};
use crate::variogram::VariogramParams;

/// A factored kriging system for one tile's observation set.
pub struct KrigingSystem {
    lu: nalgebra::FullPivLU<f64, nalgebra::Dyn, nalgebra::Dyn>,
    n: usize,
}

/// Builds and solves ordinary kriging systems.
#[derive(Debug, Clone, Copy)]
pub struct KrigingSolver {
    variogram: VariogramParams,
}

impl KrigingSolver {
    pub fn new(variogram: VariogramParams) -> Self {
        Self { variogram }
    }

    /// Build the (n+1) x (n+1) gamma matrix for an observation set.
    pub fn build_system(&self, observations: &[Observation]) -> DMatrix<f64> {
        let n = observations.len();
        let mut gamma = DMatrix::zeros(n + 1, n + 1);

        for i in 0..n {
            for j in 0..=i {
                let dist = observations[i].distance_to(observations[j].x, observations[j].y);
                let sv = self.variogram.semivariance(dist);
                gamma[(i, j)] = sv;
                gamma[(j, i)] = sv;
            }
            gamma[(i, n)] = 1.0;
            gamma[(n, i)] = 1.0;
        }
        // Lagrange multiplier corner.
        gamma[(n, n)] = 0.0;

        gamma
    }

    /// Factor the gamma matrix once per tile.
    ///
    /// A singular or near-singular system (e.g. duplicate observation
    /// positions) is surfaced as an error rather than silent NaNs.
    pub fn decompose(&self, gamma: DMatrix<f64>, n: usize) -> Result<KrigingSystem> {
        let lu = gamma.full_piv_lu();
        if !lu.is_invertible() {
            return Err(InterpolationError::UnsolvableSystem {
                tile_x: 0,
                tile_y: 0,
                reason: "singular gamma matrix".to_string(),
            });
        }
        Ok(KrigingSystem { lu, n })
    }

    /// Fill the right-hand side for a target point into a reusable buffer
    /// of length n + 1.
    pub fn fill_rhs(
        &self,
        observations: &[Observation],
        target_x: f64,
        target_y: f64,
        rhs: &mut DVector<f64>,
    ) {
        debug_assert_eq!(rhs.len(), observations.len() + 1);
        for (i, obs) in observations.iter().enumerate() {
            rhs[i] = self.variogram.semivariance(obs.distance_to(target_x, target_y));
        }
        // Constraint for weights to sum to 1.
        rhs[observations.len()] = 1.0;
    }
}

impl KrigingSystem {
    /// Solve for the weight vector of one target point.
    pub fn solve_weights(&self, rhs: &DVector<f64>) -> Result<DVector<f64>> {
        let weights = self
            .lu
            .solve(rhs)
            .ok_or_else(|| InterpolationError::UnsolvableSystem {
                tile_x: 0,
                tile_y: 0,
                reason: "no solution for kriging weights".to_string(),
            })?;

        if weights.iter().any(|w| !w.is_finite()) {
            return Err(InterpolationError::UnsolvableSystem {
                tile_x: 0,
                tile_y: 0,
                reason: "non-finite kriging weights".to_string(),
            });
        }
        Ok(weights)
    }

    /// Estimate at the target from solved weights. The Lagrange weight is
    /// the multiplier, not a data weight, and is discarded.
    pub fn estimate(&self, weights: &DVector<f64>, values: &[f64]) -> f64 {
        debug_assert_eq!(values.len(), self.n);
        (0..self.n).map(|i| weights[i] * values[i]).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> KrigingSolver {
        KrigingSolver::new(VariogramParams {
            range: 50.0,
            sill: 1.0,
            nugget: 0.0,
        })
    }

    fn observations() -> Vec<Observation> {
        vec![
            Observation::new(1.0, 2.0, 3.0),
            Observation::new(4.0, 10.0, 1.0),
            Observation::new(2.5, 6.0, 8.0),
            Observation::new(0.0, 14.0, 12.0),
        ]
    }

    #[test]
    fn test_gamma_structure() {
        let obs = observations();
        let gamma = solver().build_system(&obs);
        let n = obs.len();

        assert_eq!(gamma.nrows(), n + 1);
        assert_eq!(gamma.ncols(), n + 1);
        assert_eq!(gamma[(n, n)], 0.0);
        for i in 0..n {
            assert_eq!(gamma[(i, n)], 1.0);
            assert_eq!(gamma[(n, i)], 1.0);
            for j in 0..n {
                assert_eq!(gamma[(i, j)], gamma[(j, i)]);
            }
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let s = solver();
        let obs = observations();
        let gamma = s.build_system(&obs);
        let system = s.decompose(gamma, obs.len()).unwrap();

        let mut rhs = DVector::zeros(obs.len() + 1);
        s.fill_rhs(&obs, 7.0, 5.0, &mut rhs);
        let weights = system.solve_weights(&rhs).unwrap();

        let sum: f64 = (0..obs.len()).map(|i| weights[i]).sum();
        assert!((sum - 1.0).abs() < 1e-9, "weights sum to {}", sum);
    }

    #[test]
    fn test_single_observation_gets_full_weight() {
        let s = solver();
        let obs = vec![Observation::new(3.0, 5.0, 5.0)];
        let gamma = s.build_system(&obs);
        let system = s.decompose(gamma, 1).unwrap();

        let mut rhs = DVector::zeros(2);
        s.fill_rhs(&obs, 0.0, 0.0, &mut rhs);
        let weights = system.solve_weights(&rhs).unwrap();

        assert!((weights[0] - 1.0).abs() < 1e-9);
        let est = system.estimate(&weights, &[3.0]);
        assert!((est - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_positions_are_unsolvable() {
        let s = solver();
        // Two observations at the same spot make identical matrix rows.
        let obs = vec![
            Observation::new(1.0, 2.0, 2.0),
            Observation::new(5.0, 2.0, 2.0),
            Observation::new(3.0, 9.0, 4.0),
        ];
        let gamma = s.build_system(&obs);
        let result = s.decompose(gamma, obs.len());
        assert!(matches!(
            result,
            Err(InterpolationError::UnsolvableSystem { .. })
        ));
    }
}
