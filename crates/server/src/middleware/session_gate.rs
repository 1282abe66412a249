//! Session gate in front of the dashboard.
//!
//! Runs before any dashboard page is served: lets requests with a healthy
//! access token through, rotates the pair when the access token is missing
//! or within the refresh threshold, and otherwise clears both cookies and
//! redirects to the login page.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use clinic_core::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, SessionState, assess_session};

use super::request_id::RequestId;
use crate::AppState;
use crate::cookies;
use crate::routes::auth::rotate_tokens;

pub async fn session_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let access = cookies::read(&jar, ACCESS_TOKEN_COOKIE);
    let refresh = cookies::read(&jar, REFRESH_TOKEN_COOKIE);

    let session = assess_session(access.as_deref(), refresh.as_deref(), Utc::now());
    match (session, refresh) {
        (SessionState::TokenValid, _) => next.run(request).await,
        (SessionState::TokenExpiringOrMissing, Some(refresh)) => {
            refresh_then_continue(state, jar, &refresh, request, next).await
        }
        _ => {
            tracing::debug!(path = %request.uri().path(), "No refresh token, redirecting to login");
            to_login(&state, jar)
        }
    }
}

async fn refresh_then_continue(
    state: AppState,
    jar: CookieJar,
    refresh_token: &str,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let path = request.uri().path().to_owned();

    match rotate_tokens(&state, refresh_token, request_id.as_deref()).await {
        Ok(pair) => {
            metrics::counter!("session_refresh_total", "outcome" => "success").increment(1);
            tracing::info!(path = %path, "Session refreshed");

            let response = next.run(request).await;
            (state.cookies.store(jar, &pair), response).into_response()
        }
        Err(e) => {
            metrics::counter!("session_refresh_total", "outcome" => "failure").increment(1);
            tracing::warn!(path = %path, error = %e, "Session refresh failed, redirecting to login");
            to_login(&state, jar)
        }
    }
}

fn to_login(state: &AppState, jar: CookieJar) -> Response {
    (
        state.cookies.clear(jar),
        Redirect::temporary(&state.login_path),
    )
        .into_response()
}
