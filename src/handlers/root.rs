//! Greeting endpoint

use axum::Json;
use serde::Serialize;

/// Body of `GET /`
#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
}

/// Root handler
///
/// Always returns 200 OK with `{"message": "Hello World"}`.
pub async fn handler() -> Json<HelloResponse> {
    tracing::info!("GET request to root endpoint");
    Json(HelloResponse {
        message: "Hello World",
    })
}
