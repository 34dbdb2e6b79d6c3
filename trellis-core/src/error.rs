//! Error types for Trellis

use thiserror::Error;

/// Result type alias for Trellis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Trellis operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The project snapshot could not be fetched or was malformed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
