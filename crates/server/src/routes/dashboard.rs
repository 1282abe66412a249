//! Static dashboard bundle, served behind the session gate

use std::path::Path;

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::any};
use serde_json::json;
use tower_http::services::{ServeDir, ServeFile};

use crate::AppState;

/// Every path under this prefix passes through the session gate
pub const DASHBOARD_PREFIX: &str = "/dashboard";

/// Serve `dir` under the dashboard prefix, falling back to `index.html`
/// for client-side routes.
pub fn routes(dir: Option<&str>) -> Router<AppState> {
    match dir {
        Some(dir) => {
            let index = Path::new(dir).join("index.html");
            Router::new().nest_service(
                DASHBOARD_PREFIX,
                ServeDir::new(dir).fallback(ServeFile::new(index)),
            )
        }
        None => Router::new()
            .route(DASHBOARD_PREFIX, any(not_configured))
            .route(&format!("{DASHBOARD_PREFIX}/{{*rest}}"), any(not_configured)),
    }
}

async fn not_configured() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Dashboard no configurado"})),
    )
}
