//! HTTP request handlers for slowtask

use crate::error::AppResult;
use crate::metrics::MetricsRegistry;
use crate::middleware::metrics::track_metrics;
use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod metrics;
pub mod root;
pub mod slow;

/// Application state shared across all handlers
///
/// Holds the one metrics registry of the process. Arc'd for cheap cloning
/// across Axum handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    metrics: Arc<MetricsRegistry>,
}

impl AppState {
    /// Create a new AppState with a fresh metrics registry
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails.
    pub fn new() -> AppResult<Self> {
        Ok(Self::with_metrics(Arc::new(MetricsRegistry::new()?)))
    }

    /// Create a new AppState around an existing registry
    pub fn with_metrics(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    /// Get reference to the metrics registry
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }
}

/// Build the service router: `/`, `/slow` and `/metrics`, instrumented
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(root::handler))
        .route("/slow", get(slow::handler))
        .route("/metrics", get(metrics::handler));

    instrument(routes, state)
}

/// Wrap `routes` (fallback included) in the request instrumentation stack
///
/// Layer order, outermost first: tracing span, metrics recording, panic
/// catching. A panicking handler therefore still yields a 500 that gets
/// counted.
pub fn instrument(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{REQUESTS_TOTAL, RequestLabels};

    #[test]
    fn test_appstate_new_creates_state() {
        let state = AppState::new().expect("should create state");
        assert_eq!(state.metrics().counter_total(REQUESTS_TOTAL), 0);
    }

    #[test]
    fn test_appstate_clones_share_registry() {
        let state = AppState::new().unwrap();
        let state2 = state.clone();

        state
            .metrics()
            .increment_counter(REQUESTS_TOTAL, RequestLabels::new("GET", "/", "200"))
            .unwrap();

        assert_eq!(state2.metrics().counter_total(REQUESTS_TOTAL), 1);
    }
}
