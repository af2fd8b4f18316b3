//! Simulated slow task endpoint
//!
//! A failed task is reported in the JSON body with HTTP 200, never as an
//! error status. Clients tell the two apart by the `status` field.

use axum::Json;
use serde::Serialize;

use crate::tasks::{self, TaskFailure};

/// Body of `GET /slow`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum SlowResponse {
    /// `{"status":"Success","message":"Heavy task completed in <ms>ms"}`
    Success { message: String },
    /// `{"status":"Error","error":"<message>"}`
    Error { error: String },
}

impl SlowResponse {
    /// Shape a task result into a response body
    pub fn from_result(result: Result<u64, TaskFailure>) -> Self {
        match result {
            Ok(ms) => Self::Success {
                message: format!("Heavy task completed in {}ms", ms),
            },
            Err(failure) => Self::Error {
                error: failure.message().to_string(),
            },
        }
    }
}

/// Slow task handler
///
/// Runs the simulated task once (no retries) and always answers 200 OK.
pub async fn handler() -> Json<SlowResponse> {
    tracing::info!("GET request to /slow endpoint");

    let result = tasks::run_task().await;
    match &result {
        Ok(ms) => tracing::info!(duration_ms = ms, "Slow task completed in {}ms", ms),
        Err(failure) => tracing::error!(error = %failure, "Error in slow task"),
    }

    Json(SlowResponse::from_result(result))
}
