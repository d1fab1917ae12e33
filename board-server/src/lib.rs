//! # Mathboard Server Library
//!
//! Backend for the Mathboard browser client. Its main job is minting
//! short-lived realtime voice credentials so the long-lived API key never
//! has to live in the page.
//!
//! Used by both the binary and integration tests.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use board_tutor::realtime::SESSION_PATH;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use url::Url;

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod validation;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};

/// Path of the upstream sessions endpoint, relative to the upstream base.
pub const UPSTREAM_SESSIONS_PATH: &str = "/v1/realtime/sessions";

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    http: reqwest::Client,
    sessions_url: Arc<Url>,
    model: Arc<str>,
}

impl AppState {
    /// Create state for the upstream at `upstream`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sessions path cannot be joined onto `upstream`.
    pub fn new(upstream: &Url, model: impl Into<String>) -> Result<Self, url::ParseError> {
        Self::with_client(reqwest::Client::new(), upstream, model)
    }

    /// Create state reusing an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the sessions path cannot be joined onto `upstream`.
    pub fn with_client(
        http: reqwest::Client,
        upstream: &Url,
        model: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let sessions_url = upstream.join(UPSTREAM_SESSIONS_PATH)?;
        Ok(Self {
            http,
            sessions_url: Arc::new(sessions_url),
            model: Arc::from(model.into()),
        })
    }

    /// Create state from the server configuration.
    ///
    /// # Errors
    ///
    /// See [`AppState::new`].
    pub fn from_config(config: &ServerConfig) -> Result<Self, url::ParseError> {
        Self::new(&config.upstream_url, config.model.clone())
    }

    /// HTTP client for upstream calls.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Full upstream sessions URL.
    #[must_use]
    pub fn sessions_url(&self) -> &Url {
        &self.sessions_url
    }

    /// Realtime model requested for new sessions.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Build a CORS layer for the browser client: any origin, no credentials.
#[must_use]
pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Build the application router (everything except `/metrics`).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness))
        .route(SESSION_PATH, post(routes::create_realtime_session))
        .route("/api/message", get(routes::get_message))
        .route_layer(middleware::from_fn(metrics::track_http))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(build_cors_layer())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
