//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use board_tutor::realtime::ErrorBody;
use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Request body could not be parsed.
    #[error("Invalid request body")]
    BadRequest(String),

    /// The upstream API rejected the request or could not be reached.
    #[error("Failed to generate ephemeral key")]
    Upstream {
        /// Upstream status, when a response arrived.
        status: Option<u16>,
        /// Upstream body or transport error.
        details: String,
    },
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Validation(_) => None,
            Self::BadRequest(details) | Self::Upstream { details, .. } => Some(details.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ValidationError::MissingApiKey).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream {
                status: Some(401),
                details: "bad key".to_string()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::from(ValidationError::MissingApiKey).to_string(),
            "OpenAI API key is required"
        );
        let upstream = ApiError::Upstream {
            status: None,
            details: "connection refused".to_string(),
        };
        assert_eq!(upstream.to_string(), "Failed to generate ephemeral key");
        assert_eq!(upstream.details().as_deref(), Some("connection refused"));
    }
}
