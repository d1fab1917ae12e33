//! Prometheus metrics for board-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

const HTTP_REQUESTS_TOTAL: &str = "board_http_requests_total";
const HTTP_REQUEST_DURATION: &str = "board_http_request_duration_seconds";
const SESSIONS_MINTED_TOTAL: &str = "board_sessions_minted_total";
const UPSTREAM_DURATION: &str = "board_upstream_request_duration_seconds";
const VALIDATION_FAILURES_TOTAL: &str = "board_validation_failures_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

/// Record a session minting attempt.
///
/// * `outcome` - "success" or "failure"
pub fn record_session_minted(outcome: &str, duration_secs: f64) {
    counter!(SESSIONS_MINTED_TOTAL, "outcome" => outcome.to_string()).increment(1);
    histogram!(UPSTREAM_DURATION).record(duration_secs);
}

/// Record an input validation failure.
///
/// * `validation_type` - Type of validation that failed (api_key, voice, body)
pub fn record_validation_failure(validation_type: &str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "type" => validation_type.to_string()
    )
    .increment(1);
}

/// Middleware recording count and latency per matched route.
pub async fn track_http(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_string(),
        |matched| matched.as_str().to_string(),
    );

    let response = next.run(request).await;
    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
