//! Run-level domain configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CmlError, CmlResult};

/// Immutable configuration for one mapping run.
///
/// Defines the grid extent and the projection anchor. Created once at
/// startup from the run configuration file and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    /// Longitude of the domain centre in degrees.
    pub centre_lon: f64,
    /// Latitude of the domain centre in degrees.
    pub centre_lat: f64,
    /// Number of grid rows (y).
    pub n_rows: usize,
    /// Number of grid columns (x).
    pub n_cols: usize,
    /// Pixel size in meters.
    pub p_size: f64,
    /// Target CRS identifier, e.g. "aeqd" or "tmerc:4.0".
    pub crs: String,
}

impl Domain {
    /// Validate the domain parameters. Fatal before any computation.
    pub fn validate(&self) -> CmlResult<()> {
        if !(-180.0..=180.0).contains(&self.centre_lon) {
            return Err(CmlError::config(format!(
                "centre_lon {} outside [-180, 180]",
                self.centre_lon
            )));
        }
        if !(-90.0..=90.0).contains(&self.centre_lat) {
            return Err(CmlError::config(format!(
                "centre_lat {} outside [-90, 90]",
                self.centre_lat
            )));
        }
        if self.n_rows == 0 || self.n_cols == 0 {
            return Err(CmlError::config("grid dimensions must be > 0".to_string()));
        }
        if !(self.p_size > 0.0) {
            return Err(CmlError::config(format!(
                "p_size must be > 0, got {}",
                self.p_size
            )));
        }
        if self.crs.trim().is_empty() {
            return Err(CmlError::config("crs identifier is empty".to_string()));
        }
        Ok(())
    }

    /// Half-diagonal extent of the grid in meters.
    ///
    /// Used as the metadata search radius so the link cache covers the
    /// full grid including its corners.
    pub fn half_diagonal_m(&self) -> f64 {
        let half_y = self.n_rows as f64 * self.p_size / 2.0;
        let half_x = self.n_cols as f64 * self.p_size / 2.0;
        (half_x * half_x + half_y * half_y).sqrt()
    }
}
