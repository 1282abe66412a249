//! Audit trail for state-changing requests

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use super::request_id::RequestId;

fn is_mutation(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Log every POST/PUT/PATCH/DELETE under the `audit` target once the
/// response is known. Failed mutations are logged at warn.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    if !is_mutation(request.method()) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string());
    let request_id = RequestId::of(request.extensions())
        .unwrap_or("unknown")
        .to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            target: "audit",
            request_id = %request_id,
            method = %method,
            path = %path,
            route = route.as_deref().unwrap_or("-"),
            status = status.as_u16(),
            elapsed_ms,
            "Mutation rejected"
        );
    } else {
        tracing::info!(
            target: "audit",
            request_id = %request_id,
            method = %method,
            path = %path,
            route = route.as_deref().unwrap_or("-"),
            status = status.as_u16(),
            elapsed_ms,
            "Mutation accepted"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_writes_are_audited() {
        assert!(is_mutation(&Method::PATCH));
        assert!(is_mutation(&Method::DELETE));
        assert!(!is_mutation(&Method::GET));
        assert!(!is_mutation(&Method::OPTIONS));
    }
}
