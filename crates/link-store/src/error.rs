//! Error types for store access.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by the link store.
///
/// Query failures are recovered locally by the callers (treated as an
/// empty result with a logged warning); only connection setup is fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not establish the store connection.
    #[error("store connection error: {0}")]
    Connection(String),

    /// A query failed to execute.
    #[error("store query error: {0}")]
    Query(String),
}
