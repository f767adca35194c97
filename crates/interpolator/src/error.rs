//! Error types for interpolation.

use thiserror::Error;

/// Result type for interpolation operations.
pub type Result<T> = std::result::Result<T, InterpolationError>;

/// Errors that can occur while building a rainfall grid.
///
/// An unsolvable system is distinct from the insufficient-data case: the
/// latter never reaches the solver and is expressed as a fully missing
/// tile, not an error.
#[derive(Debug, Error)]
pub enum InterpolationError {
    /// The kriging system for a tile is singular or near-singular, e.g.
    /// because of duplicate observation positions.
    #[error("unsolvable kriging system for tile centred at ({tile_x}, {tile_y}): {reason}")]
    UnsolvableSystem {
        tile_x: usize,
        tile_y: usize,
        reason: String,
    },

    /// Invalid estimator or builder configuration.
    #[error("interpolation configuration error: {0}")]
    Config(String),
}

impl InterpolationError {
    /// Attach the failing tile's centre coordinates to a solver error.
    pub fn at_tile(self, x: usize, y: usize) -> Self {
        match self {
            Self::UnsolvableSystem { reason, .. } => Self::UnsolvableSystem {
                tile_x: x,
                tile_y: y,
                reason,
            },
            other => other,
        }
    }
}
