pub mod auth;
mod catalog;
pub mod dashboard;
pub mod health;
pub mod metrics;
mod proxy;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    routing::{MethodRouter, post},
};

use crate::AppState;

/// Build the `/api` routes: the session endpoints plus one generic proxy
/// handler per catalog entry.
pub fn api_routes() -> Router<AppState> {
    let mut by_path: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();

    for route in catalog::routes() {
        let path = route.path.clone();
        let filter = route.verb.filter();
        let route = Arc::new(route);

        let handler = move |State(state): State<AppState>, request: Request| {
            let route = Arc::clone(&route);
            async move { proxy::forward(&route, state, request).await }
        };

        let methods = by_path.remove(&path).unwrap_or_else(MethodRouter::new);
        by_path.insert(path, methods.on(filter, handler));
    }

    let router = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/refresh", post(auth::refresh));

    by_path
        .into_iter()
        .fold(router, |router, (path, methods)| router.route(&path, methods))
}
