//! Tutor error types.

use board_renderer::RenderError;
use thiserror::Error;

/// Result type for AI service calls.
pub type AiResult<T> = Result<T, AiError>;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Result type for tutor session operations.
pub type TutorResult<T> = Result<T, TutorError>;

/// Errors reported by an AI provider or the session-minting backend.
#[derive(Debug, Clone, Error)]
pub enum AiError {
    /// No provider is available to serve the call.
    #[error("{0}")]
    NotConfigured(String),

    /// Network or transport failure.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Credentials were rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The service asked us to slow down.
    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited {
        /// Suggested wait before retrying.
        retry_after_ms: u64,
    },

    /// The model failed to produce a result.
    #[error("Model error: {0}")]
    Model(String),

    /// The response could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The backend answered with an error status.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Error message from the body.
        message: String,
        /// Optional extra details from the body.
        details: Option<String>,
    },
}

/// Errors from capturing (and optionally analyzing) the whiteboard.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No surface is mounted under any of the selectors.
    #[error("Could not find whiteboard canvas element (tried {})", selectors.join(", "))]
    SurfaceNotFound {
        /// Selectors tried, in order.
        selectors: Vec<String>,
    },

    /// Rasterizing or encoding the surface failed.
    #[error("Failed to capture whiteboard: {0}")]
    Encode(#[from] RenderError),

    /// The analysis callback failed.
    #[error("Failed to analyze whiteboard: {0}")]
    Analysis(#[source] AiError),
}

/// Errors from the tutor session.
#[derive(Debug, Error)]
pub enum TutorError {
    /// The session has no provider.
    #[error("No AI provider configured")]
    NoProvider,

    /// The provider failed.
    #[error(transparent)]
    Provider(#[from] AiError),
}

impl From<TutorError> for AiError {
    fn from(err: TutorError) -> Self {
        match err {
            TutorError::NoProvider => Self::NotConfigured(TutorError::NoProvider.to_string()),
            TutorError::Provider(inner) => inner,
        }
    }
}
