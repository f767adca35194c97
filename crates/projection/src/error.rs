//! Error types for coordinate projection.

use thiserror::Error;

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Errors that can occur when projecting coordinates.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Malformed or unsupported CRS identifier. Raised at initialization
    /// and treated as a configuration error.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// Invalid domain geometry for this projection.
    #[error("invalid projection domain: {0}")]
    InvalidDomain(String),

    /// Geographic input the transform cannot represent (e.g. the antipode
    /// of the projection origin). A data error, not a crash.
    #[error("geographic point ({lon}, {lat}) is out of range for the projection")]
    OutOfRange { lon: f64, lat: f64 },
}
