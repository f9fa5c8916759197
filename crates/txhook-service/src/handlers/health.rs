//! Health check handlers.

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status, always `HEALTHY` while the process serves requests.
    pub status: &'static str,
    /// Current server time (RFC 3339).
    pub current_time: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "HEALTHY",
        current_time: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
    })
}
