//! Error types shared across the workspace.

use thiserror::Error;

/// Result type alias using CmlError.
pub type CmlResult<T> = Result<T, CmlError>;

/// Errors raised by the shared domain types.
#[derive(Debug, Error)]
pub enum CmlError {
    /// Malformed or missing run configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// A timestamp string that is not `YYYY-MM-DDTHH:MM:SSZ`.
    #[error("invalid time: {0}")]
    InvalidTime(String),
}

impl CmlError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
