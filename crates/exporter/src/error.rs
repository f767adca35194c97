//! Error types for grid export.

use thiserror::Error;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while writing an exported grid.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Invalid exporter configuration.
    #[error("export configuration error: {0}")]
    Config(String),

    /// Storage/IO error from the Zarr backend.
    #[error("export storage error: {0}")]
    Storage(String),

    /// The grid and axes disagree about dimensions.
    #[error("inconsistent export dimensions: {0}")]
    Dimensions(String),
}
