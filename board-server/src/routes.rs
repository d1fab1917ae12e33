//! API route handlers.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use board_tutor::realtime::SessionRequest;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::validation::{validate_api_key, validate_voice};
use crate::AppState;

/// Greeting served by `/api/message`.
pub const GREETING: &str = "Why did the backend cross the road? To get to the other API! 🐔";

/// Body sent to the upstream sessions endpoint.
#[derive(Debug, Serialize)]
struct UpstreamSessionRequest<'a> {
    model: &'a str,
    voice: &'a str,
}

/// Mint an ephemeral realtime session for the browser client.
///
/// The upstream session JSON is returned as-is so the client can read the
/// short-lived `client_secret` from it.
#[tracing::instrument(name = "create_realtime_session", skip(state, payload))]
pub async fn create_realtime_session(
    State(state): State<AppState>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload.map_err(|rejection| {
        metrics::record_validation_failure("body");
        ApiError::BadRequest(rejection.body_text())
    })?;

    let (api_key, voice) = validate_api_key(request.api_key.as_deref())
        .and_then(|key| Ok((key, validate_voice(request.voice.as_deref())?)))
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected session request");
            metrics::record_validation_failure(e.kind());
            ApiError::from(e)
        })?;

    let body = UpstreamSessionRequest {
        model: state.model(),
        voice: voice.as_str(),
    };

    let start = Instant::now();
    let result = mint_upstream(&state, api_key, &body).await;
    let elapsed = start.elapsed().as_secs_f64();

    match result {
        Ok(session) => {
            metrics::record_session_minted("success", elapsed);
            tracing::info!(%voice, model = state.model(), "ephemeral session minted");
            Ok(Json(session))
        }
        Err(err) => {
            metrics::record_session_minted("failure", elapsed);
            if let ApiError::Upstream { status, details } = &err {
                tracing::error!(?status, %details, "failed to generate ephemeral key");
            }
            Err(err)
        }
    }
}

async fn mint_upstream(
    state: &AppState,
    api_key: &str,
    body: &UpstreamSessionRequest<'_>,
) -> ApiResult<Value> {
    let response = state
        .http()
        .post(state.sessions_url().clone())
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| ApiError::Upstream {
            status: None,
            details: e.to_string(),
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| ApiError::Upstream {
        status: Some(status.as_u16()),
        details: e.to_string(),
    })?;

    if !status.is_success() {
        return Err(ApiError::Upstream {
            status: Some(status.as_u16()),
            details: format!("upstream returned {status}: {text}"),
        });
    }

    serde_json::from_str(&text).map_err(|e| ApiError::Upstream {
        status: Some(status.as_u16()),
        details: format!("invalid upstream JSON: {e}"),
    })
}

/// Fixed greeting, used by the client as a connectivity check.
#[tracing::instrument(name = "get_message")]
pub async fn get_message() -> Json<Value> {
    Json(serde_json::json!({ "message": GREETING }))
}
