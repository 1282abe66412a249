//! Prometheus metrics collection middleware
//!
//! Records `http_requests_total` (counter) and `http_request_duration_seconds`
//! (histogram) for every request, labelled by method, route and status.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Label for a request: the matched route template when routing found one
/// (`/api/users/{id}`), otherwise the raw path with id-like segments
/// collapsed so unmatched scanner traffic cannot explode label cardinality.
fn route_label(request: &Request) -> String {
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => collapse_ids(request.uri().path()),
    }
}

fn collapse_ids(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            let numeric = !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit());
            if numeric || uuid::Uuid::try_parse(seg).is_ok() {
                ":id"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = route_label(&request);

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "route" => route
    )
    .record(elapsed);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn unmatched_ids_collapse_to_placeholder() {
        assert_eq!(
            collapse_ids("/api/patients/5f0e8a2c-1b3d-4c5e-9f7a-0b1c2d3e4f5a/activate"),
            "/api/patients/:id/activate"
        );
        assert_eq!(collapse_ids("/api/roles/42"), "/api/roles/:id");
        assert_eq!(collapse_ids("/api/floors/stats"), "/api/floors/stats");
    }

    #[test]
    fn falls_back_to_raw_path_without_a_match() {
        let request = Request::builder()
            .uri("/nope/7")
            .body(Body::empty())
            .unwrap();
        assert_eq!(route_label(&request), "/nope/:id");
    }
}
