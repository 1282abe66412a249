//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Report whether the gateway can reach an upstream at all
pub async fn check(State(state): State<AppState>) -> impl IntoResponse {
    if state.upstream.is_configured() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                reason: None,
            }),
        )
    } else {
        tracing::error!("Health check failed: API_URL not configured");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                reason: Some("Falta API_URL".to_string()),
            }),
        )
    }
}
