//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub REST API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// HTTP transport error talking to the GraphQL endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// The GraphQL endpoint answered with errors
    #[error("GraphQL errors: {}", .0.join(", "))]
    GraphQL(Vec<String>),

    /// Project, owner or item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Project has no field with the given name
    #[error("Project field '{0}' not found")]
    FieldNotFound(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<Error> for trellis_core::Error {
    fn from(err: Error) -> Self {
        trellis_core::Error::Upstream(err.to_string())
    }
}
