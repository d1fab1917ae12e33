//! Client for the backend's ephemeral realtime session endpoint.
//!
//! The browser-side tutor never holds a long-lived secret for the voice
//! API. It asks the backend to mint a short-lived credential per session.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AiError, AiResult};
use crate::provider::Voice;

/// Path of the session-minting endpoint.
pub const SESSION_PATH: &str = "/api/realtime/session";

/// Request body for the session-minting endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Long-lived API key the backend exchanges for an ephemeral one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Voice name; the backend defaults to `alloy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Error body returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short error message.
    pub error: String,
    /// Optional detail, typically the upstream response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// The short-lived secret inside a minted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSecret {
    /// Token the client authenticates the realtime connection with.
    pub value: String,
    /// Unix timestamp after which the token is rejected.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// A minted realtime session as returned by the vendor, passed through by the
/// backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemeralSession {
    /// Vendor session id.
    #[serde(default)]
    pub id: Option<String>,
    /// Realtime model the session is bound to.
    #[serde(default)]
    pub model: Option<String>,
    /// Voice the session speaks with.
    #[serde(default)]
    pub voice: Option<String>,
    /// Ephemeral credential.
    pub client_secret: ClientSecret,
    /// Every other field, untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Mints ephemeral realtime sessions through the backend.
#[derive(Debug, Clone)]
pub struct EphemeralSessionClient {
    http: Client,
    endpoint: Url,
}

impl EphemeralSessionClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> AiResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn with_client(http: Client, base_url: &str) -> AiResult<Self> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(SESSION_PATH))
            .map_err(|e| AiError::Connection(format!("invalid backend URL {base_url}: {e}")))?;
        Ok(Self { http, endpoint })
    }

    /// The full endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Mint a session for `api_key` speaking with `voice`.
    ///
    /// # Errors
    ///
    /// Transport failures map to [`AiError::Connection`], rejected keys to
    /// [`AiError::Auth`], throttling to [`AiError::RateLimited`], other error
    /// statuses to [`AiError::Upstream`], and unparseable bodies to
    /// [`AiError::InvalidResponse`].
    #[tracing::instrument(skip(self, api_key), fields(endpoint = %self.endpoint))]
    pub async fn mint(&self, api_key: &str, voice: Voice) -> AiResult<EphemeralSession> {
        let request = SessionRequest {
            api_key: Some(api_key.to_string()),
            voice: Some(voice.to_string()),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::Connection(e.to_string()))?;

        if !status.is_success() {
            let err = status_error(status, &body);
            tracing::warn!(%status, error = %err, "session minting failed");
            return Err(err);
        }

        let session: EphemeralSession = serde_json::from_str(&body)
            .map_err(|e| AiError::InvalidResponse(format!("unexpected session body: {e}")))?;
        tracing::info!(id = ?session.id, expires_at = ?session.client_secret.expires_at, "ephemeral session minted");
        Ok(session)
    }
}

fn status_error(status: StatusCode, body: &str) -> AiError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let (message, details) = match parsed {
        Some(ErrorBody { error, details }) => (error, details),
        None => (body.to_string(), None),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AiError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited {
            retry_after_ms: 1000,
        },
        _ => AiError::Upstream {
            status: status.as_u16(),
            message,
            details,
        },
    }
}
