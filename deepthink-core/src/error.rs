//! Error types for deepthink-core.

use thiserror::Error;

/// Result type alias using deepthink-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for memory and routing operations
#[derive(Error, Debug)]
pub enum Error {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors (malformed durable content is fatal on load)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Routing errors
    #[error("Unknown research method: {0}")]
    UnknownMethod(String),

    #[error("Research backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create a backend error from any displayable failure
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}
