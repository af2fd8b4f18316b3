//! Prometheus metrics endpoint
//!
//! Exposes metrics in Prometheus text format for scraping.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::AppResult;
use crate::handlers::AppState;

/// Metrics handler for Prometheus scraping
///
/// # Response
///
/// - `200 OK` with metrics in Prometheus text format
/// - `500 Internal Server Error` if encoding fails
///
/// # Example
///
/// ```bash
/// curl http://localhost:8000/metrics
/// # HELP http_requests_total Total number of HTTP requests by method, route and status code
/// # TYPE http_requests_total counter
/// http_requests_total{method="GET",route="/",status_code="200"} 3
/// ```
pub async fn handler(State(state): State<AppState>) -> AppResult<Response> {
    let metrics = state.metrics();
    let body = metrics.render().inspect_err(|e| {
        tracing::error!(error = %e, "Failed to render metrics for Prometheus scraping");
    })?;

    Ok(([(header::CONTENT_TYPE, metrics.content_type())], body).into_response())
}
