//! Login, logout and refresh.
//!
//! These are the only handlers that write the session cookies; every other
//! route just reads the access token.

use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use clinic_core::{
    ACCESS_TOKEN_COOKIE, LoginRequest, REFRESH_TOKEN_COOKIE, TokenPair, validate_as,
};
use serde_json::json;

use super::proxy::{BodyMode, read_payload};
use crate::AppState;
use crate::cookies;
use crate::error::AppError;
use crate::middleware::RequestId;
use crate::relay::UpstreamReply;

const LOGIN_TAG: &str = "POST /api/auth/login";
const LOGOUT_TAG: &str = "POST /api/auth/logout";
const REFRESH_TAG: &str = "POST /api/auth/refresh";

/// POST /api/auth/login - Authenticate and store the session cookies
pub async fn login(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let jar = CookieJar::from_headers(&parts.headers);

    let reply = match sign_in(&state, body, RequestId::of(&parts.extensions)).await {
        Ok(reply) => reply,
        Err(e) => return e.into_logged_response(LOGIN_TAG),
    };

    match session_from(&reply) {
        Some(pair) => {
            tracing::info!(status = %reply.status, "Login succeeded, session cookies set");
            (state.cookies.store(jar, &pair), reply).into_response()
        }
        None => reply.into_response(),
    }
}

async fn sign_in(
    state: &AppState,
    body: Body,
    request_id: Option<&str>,
) -> Result<UpstreamReply, AppError> {
    state.upstream.ensure_configured()?;
    let credentials = read_payload(body, BodyMode::Json, Some(validate_as::<LoginRequest>)).await?;
    state
        .upstream
        .post("/auth/login", None, credentials.as_ref(), request_id)
        .await
}

fn session_from(reply: &UpstreamReply) -> Option<TokenPair> {
    if !reply.status.is_success() {
        return None;
    }
    let pair = reply.body.as_ref().and_then(TokenPair::from_envelope);
    if pair.is_none() {
        tracing::warn!(status = %reply.status, "Upstream login succeeded without a token pair");
    }
    pair
}

/// POST /api/auth/logout - End the session upstream and clear both cookies
pub async fn logout(State(state): State<AppState>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();
    let jar = CookieJar::from_headers(&parts.headers);
    let access_token = cookies::read(&jar, ACCESS_TOKEN_COOKIE);

    let result = match access_token.as_deref() {
        Some(token) => state
            .upstream
            .post(
                "/auth/logout",
                Some(token),
                None,
                RequestId::of(&parts.extensions),
            )
            .await
            .map(IntoResponse::into_response),
        None => Ok(Json(json!({"success": true, "message": "Sesión cerrada"})).into_response()),
    };
    let response = result.unwrap_or_else(|e| e.into_logged_response(LOGOUT_TAG));

    // Applied after every outcome above has been turned into a response.
    (state.cookies.clear(jar), response).into_response()
}

/// POST /api/auth/refresh - Exchange the refresh cookie for a new pair.
///
/// The pair is returned as JSON; storing it is the caller's job.
pub async fn refresh(State(state): State<AppState>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();
    let jar = CookieJar::from_headers(&parts.headers);

    let result = refreshed_pair(&state, &jar, RequestId::of(&parts.extensions)).await;

    match result {
        Ok(pair) => Json(pair.with_effective_expiry()).into_response(),
        Err(e) => e.into_logged_response(REFRESH_TAG),
    }
}

async fn refreshed_pair(
    state: &AppState,
    jar: &CookieJar,
    request_id: Option<&str>,
) -> Result<TokenPair, AppError> {
    state.upstream.ensure_configured()?;
    let refresh_token = cookies::read(jar, REFRESH_TOKEN_COOKIE)
        .ok_or(AppError::Unauthenticated(REFRESH_TOKEN_COOKIE))?;
    rotate_tokens(state, &refresh_token, request_id).await
}

/// Ask the upstream for a new token pair.
///
/// A non-success answer is returned as `AppError::Upstream` so it can be
/// relayed; a success without both tokens is `IncompleteTokenPair`.
pub(crate) async fn rotate_tokens(
    state: &AppState,
    refresh_token: &str,
    request_id: Option<&str>,
) -> Result<TokenPair, AppError> {
    let body = json!({"refreshToken": refresh_token});
    let reply = state
        .upstream
        .post("/auth/refresh", Some(refresh_token), Some(&body), request_id)
        .await?;

    if !reply.status.is_success() {
        return Err(AppError::Upstream(reply));
    }

    reply
        .body
        .as_ref()
        .and_then(TokenPair::from_envelope)
        .ok_or(AppError::IncompleteTokenPair)
}
