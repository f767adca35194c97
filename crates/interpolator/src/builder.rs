//! Box-tiled grid builder.
//!
//! Partitions the output grid into square tiles of `box_step` pixels.
//! Each tile selects the observations within the estimator's search
//! radius of its centre, then estimates every pixel it covers from that
//! fixed local set. Tiles with too few local observations stay entirely
//! at the missing-data sentinel. Tiles are independent; the same
//! observation may serve several adjacent tiles.

use cml_common::{Observation, RainGrid};
use nalgebra::DVector;
use tracing::debug;

use crate::config::{BuilderConfig, EstimatorKind};
use crate::error::{InterpolationError, Result};
use crate::idw;
use crate::kriging::KrigingSolver;

/// Produces one dense rainfall grid per time step from a transient
/// observation list.
pub struct GridBuilder {
    n_rows: usize,
    n_cols: usize,
    config: BuilderConfig,
}

impl GridBuilder {
    /// Create a builder for a fixed grid geometry.
    pub fn new(n_rows: usize, n_cols: usize, config: BuilderConfig) -> Result<Self> {
        config.validate().map_err(InterpolationError::Config)?;
        if n_rows == 0 || n_cols == 0 {
            return Err(InterpolationError::Config(
                "grid dimensions must be > 0".to_string(),
            ));
        }
        Ok(Self {
            n_rows,
            n_cols,
            config,
        })
    }

    /// Build the full grid for one time step.
    ///
    /// Deterministic for fixed inputs: observation selection is a linear
    /// scan in input order and all qualifying observations within radius
    /// are always included. An unsolvable kriging tile aborts the
    /// computation; an under-sampled tile is left as missing data.
    pub fn build(
        &self,
        estimator: EstimatorKind,
        observations: &[Observation],
    ) -> Result<RainGrid> {
        let mut grid = RainGrid::filled_with_nan(self.n_rows, self.n_cols);

        let (range, min_locals) = match estimator {
            EstimatorKind::Kriging => (self.config.kriging.range, self.config.kriging.min_locals),
            EstimatorKind::Idw => (self.config.idw.range, self.config.idw.min_locals),
        };

        let step = self.config.box_step;
        let half = step / 2;
        let mut skipped_tiles = 0usize;

        for cy in (half..self.n_rows + half).step_by(step) {
            for cx in (half..self.n_cols + half).step_by(step) {
                let locals =
                    local_observations(cx as f64, cy as f64, range, observations);
                if locals.len() < min_locals {
                    skipped_tiles += 1;
                    continue;
                }

                match estimator {
                    EstimatorKind::Kriging => self
                        .kriging_tile(&mut grid, cx, cy, &locals)
                        .map_err(|e| e.at_tile(cx, cy))?,
                    EstimatorKind::Idw => self.idw_tile(&mut grid, cx, cy, &locals),
                }
            }
        }

        debug!(
            estimator = %estimator,
            observations = observations.len(),
            skipped_tiles,
            missing_cells = grid.missing_count(),
            "built rainfall grid"
        );
        Ok(grid)
    }

    /// Estimate one tile with ordinary kriging.
    ///
    /// The gamma matrix is factored once for the tile; the target
    /// semivariance vector is rebuilt per pixel into a reusable buffer.
    fn kriging_tile(
        &self,
        grid: &mut RainGrid,
        cx: usize,
        cy: usize,
        locals: &[Observation],
    ) -> Result<()> {
        let solver = KrigingSolver::new(self.config.kriging.variogram);
        let gamma = solver.build_system(locals);
        let system = solver.decompose(gamma, locals.len())?;

        let values: Vec<f64> = locals
            .iter()
            .map(|o| self.config.kriging.to_ihs(o.value))
            .collect();

        let mut rhs = DVector::zeros(locals.len() + 1);
        for (px, py) in self.tile_pixels(cx, cy) {
            solver.fill_rhs(locals, px as f64, py as f64, &mut rhs);
            let weights = system.solve_weights(&rhs)?;
            let estimate = system.estimate(&weights, &values);
            let rain = self.config.kriging.from_ihs(estimate);
            grid.set(px, py, self.clamp(rain));
        }
        Ok(())
    }

    /// Estimate one tile with squared-inverse-distance weights, raw rates.
    fn idw_tile(&self, grid: &mut RainGrid, cx: usize, cy: usize, locals: &[Observation]) {
        for (px, py) in self.tile_pixels(cx, cy) {
            let rain = idw::interpolate(px as f64, py as f64, locals);
            grid.set(px, py, self.clamp(rain));
        }
    }

    /// In-bounds pixels of the tile centred at (cx, cy). Tiles may extend
    /// past the grid edge; out-of-bounds cells are skipped per-pixel.
    fn tile_pixels(&self, cx: usize, cy: usize) -> Vec<(usize, usize)> {
        let half = self.config.box_step / 2;
        let x0 = cx.saturating_sub(half);
        let y0 = cy.saturating_sub(half);
        let x1 = (cx + half + 1).min(self.n_cols);
        let y1 = (cy + half + 1).min(self.n_rows);

        let mut pixels = Vec::with_capacity(self.config.box_step * self.config.box_step);
        for py in y0..y1 {
            for px in x0..x1 {
                pixels.push((px, py));
            }
        }
        pixels
    }

    /// Physical plausibility clamps on a computed rate.
    ///
    /// Implausibly large values become missing data; values below the
    /// noise floor are clamped to zero.
    fn clamp(&self, rain: f64) -> f32 {
        if !rain.is_finite() || rain > self.config.max_rain {
            f32::NAN
        } else if rain < self.config.min_rain {
            0.0
        } else {
            rain as f32
        }
    }
}

/// All observations within `range` pixels of the tile centre, linear scan.
fn local_observations(
    cx: f64,
    cy: f64,
    range: f64,
    observations: &[Observation],
) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| o.distance_to(cx, cy) <= range)
        .copied()
        .collect()
}
