//! clinic-server library crate
//!
//! Exposes `build_app`, `AppState` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod config;
mod cookies;
mod error;
mod middleware;
mod relay;
mod routes;
mod upstream;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use cookies::CookiePolicy;
use upstream::UpstreamClient;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    upstream: UpstreamClient,
    cookies: CookiePolicy,
    login_path: Arc<str>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            upstream: UpstreamClient::new(
                config.api_url.clone(),
                Duration::from_secs(config.upstream_timeout_secs),
            ),
            cookies: CookiePolicy::new(config.secure_cookies),
            login_path: Arc::from(config.login_path.as_str()),
        }
    }
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(config: &Config) -> Router {
    let state = AppState::new(config);

    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // Proxy surface: session endpoints plus the resource catalog
    let api = Router::new()
        .nest("/api", routes::api_routes())
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // Dashboard pages sit behind the session gate
    let dashboard = routes::dashboard::routes(config.dashboard_dir.as_deref()).layer(
        axum_mw::from_fn_with_state(state.clone(), middleware::session_gate),
    );

    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle()));

    Router::new()
        .merge(public_routes)
        .merge(api)
        .merge(dashboard)
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}

/// Handle to the process-wide Prometheus recorder.
///
/// The recorder is installed once; every app built afterwards (integration
/// tests build many) renders the same registry.
fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("Another metrics recorder is installed, /metrics will stay empty");
            }
            handle
        })
        .clone()
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    // Cookies only travel cross-origin with explicit origins
    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderName::from_static("x-request-id"),
        ])
}
