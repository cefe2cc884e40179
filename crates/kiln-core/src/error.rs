//! Error types for Kiln

use thiserror::Error;

/// The main error type for Kiln operations
#[derive(Debug, Error)]
pub enum KilnError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Audio error: {0}")]
    AudioError(String),

    #[error("Presence error: {0}")]
    PresenceError(String),

    #[error("JSON parse error: {0}")]
    JsonError(String),
}

/// Result type alias for Kiln operations
pub type Result<T> = std::result::Result<T, KilnError>;

impl From<serde_json::Error> for KilnError {
    fn from(err: serde_json::Error) -> Self {
        KilnError::JsonError(err.to_string())
    }
}
