//! Box-tiled surface estimation from sparse link observations.
//!
//! Fills a dense rainfall grid from irregular point observations with one
//! of two interchangeable estimators:
//!
//! - **Ordinary kriging** — variogram-based geostatistical weights from a
//!   linear solve per tile, unbiased by a Lagrange constraint.
//! - **IDW** — squared-inverse-distance weighting, no matrix solve.
//!
//! The grid is partitioned into fixed-size square tiles; each tile selects
//! its local observations once, estimates every pixel it covers, and
//! leaves the whole tile as missing data when under-sampled.

pub mod builder;
pub mod config;
pub mod error;
pub mod idw;
pub mod kriging;
pub mod variogram;

pub use builder::GridBuilder;
pub use config::{BuilderConfig, EstimatorKind, IdwConfig, KrigingConfig};
pub use error::{InterpolationError, Result};
pub use kriging::KrigingSolver;
pub use variogram::VariogramParams;
