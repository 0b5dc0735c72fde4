//! Error types for chatapp-core

use thiserror::Error;

use crate::backend::BackendError;

/// Result type alias using chatapp-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in chatapp-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Backend (auth or document store) error
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Blank message text
    #[error("Message text must not be blank")]
    EmptyMessage,

    /// Profile form equals the loaded profile
    #[error("No profile changes to save")]
    NoChanges,

    /// Form validation failed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
