//! Error types for whiteboard operations.

use thiserror::Error;

/// Result type for whiteboard operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors that can occur in whiteboard operations.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Element not found in scene.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Invalid element data (e.g. a freedraw stroke without points).
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
