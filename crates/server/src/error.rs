//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clinic_core::FieldErrors;
use serde_json::json;
use thiserror::Error;

use crate::relay::UpstreamReply;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("API_URL is not configured")]
    MissingApiUrl,

    #[error("missing {0} cookie")]
    Unauthenticated(&'static str),

    #[error("request body failed validation")]
    Validation(FieldErrors),

    /// Non-success answer from the upstream, relayed as-is
    #[error("upstream answered with an error status")]
    Upstream(UpstreamReply),

    #[error("refresh response is missing a token")]
    IncompleteTokenPair,

    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(reply) => reply.status,
            AppError::MissingApiUrl
            | AppError::IncompleteTokenPair
            | AppError::Http(_)
            | AppError::Json(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log under the route's tag, then render.
    pub fn into_logged_response(self, route: &str) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!(route, error = %self, "Request failed");
        } else {
            tracing::debug!(route, error = %self, "Request rejected");
        }
        self.into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::Upstream(reply) => return reply.into_response(),
            AppError::MissingApiUrl => json!({"error": "Falta API_URL"}),
            AppError::Unauthenticated(cookie) => {
                json!({"error": format!("No autenticado: falta {cookie}")})
            }
            AppError::Validation(details) => {
                json!({"error": "Datos inválidos", "details": details})
            }
            AppError::IncompleteTokenPair => json!({"error": "Respuesta de refresh inválida"}),
            AppError::Http(_) | AppError::Json(_) | AppError::Internal(_) => {
                json!({"error": "Error interno"})
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value as JsonValue;

    async fn render(err: AppError) -> (StatusCode, JsonValue) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_api_url_is_a_server_error() {
        let (status, body) = render(AppError::MissingApiUrl).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Falta API_URL"}));
    }

    #[tokio::test]
    async fn unauthenticated_names_the_cookie() {
        let (status, body) = render(AppError::Unauthenticated("accessToken")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "No autenticado: falta accessToken");
    }

    #[tokio::test]
    async fn validation_carries_field_details() {
        let mut details = FieldErrors::default();
        details.add("email", "Correo electrónico inválido");
        let (status, body) = render(AppError::Validation(details)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["email"][0], "Correo electrónico inválido");
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let (status, body) = render(AppError::Internal("pool exhausted".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Error interno"}));
    }
}
