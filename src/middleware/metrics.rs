//! Request instrumentation middleware
//!
//! Times every request and records exactly one counter increment and one
//! latency observation, labeled with method, raw path and final status.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use crate::handlers::AppState;
use crate::metrics::RequestLabels;

/// Middleware that records request count and latency into the registry
///
/// The response passes through untouched. Recording failures are logged
/// and never change what the client receives.
pub async fn track_metrics(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request.uri().path().to_owned();

    let response = next.run(request).await;

    let elapsed = start.elapsed().as_secs_f64();
    let status = response.status();
    let labels = RequestLabels::new(method.as_str(), &route, status.as_str());

    if let Err(e) = state.metrics().record_request(labels, elapsed) {
        tracing::warn!(
            error = %e,
            method = %method,
            route = %route,
            status = status.as_u16(),
            "Failed to record request metrics"
        );
    }

    response
}
