//! Coordinate projection for the rainfall grid.
//!
//! Maps geographic longitude/latitude into the uniform pixel grid of the
//! output map and back. Implements the supported map projections from
//! scratch without external dependencies.

pub mod crs;
pub mod error;
pub mod image;
pub mod transform;

pub use crs::CrsSpec;
pub use error::{ProjectionError, Result};
pub use image::{ImageProjection, ProjectionMetadata};
