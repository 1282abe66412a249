//! Generic authenticated proxy handler.
//!
//! Every upstream resource is described by a `ProxyRoute`; one handler
//! executes them all. Per request it checks, in order: upstream configured,
//! access cookie present (for session routes), body readable and valid. Only
//! then is the upstream contacted, and its answer is relayed unchanged.

use std::fmt;

use axum::{
    RequestPartsExt,
    body::Body,
    extract::{RawPathParams, Request},
    http::{Method, request::Parts},
    response::{IntoResponse, Response},
    routing::MethodFilter,
};
use axum_extra::extract::cookie::CookieJar;
use clinic_core::{ACCESS_TOKEN_COOKIE, FieldErrors, Validator};
use serde_json::Value as JsonValue;

use crate::AppState;
use crate::cookies;
use crate::error::AppError;
use crate::middleware::RequestId;
use crate::relay::UpstreamReply;
use crate::upstream::UpstreamCall;

/// Largest request body forwarded upstream
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Patch,
    Delete,
}

impl Verb {
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }

    pub fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Patch => MethodFilter::PATCH,
            Verb::Delete => MethodFilter::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method().as_str())
    }
}

/// What the handler does with the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Ignored, nothing forwarded
    None,
    /// Must be JSON
    Json,
    /// JSON if present, nothing forwarded when empty
    OptionalJson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Requires the access-token cookie, forwarded as a bearer token
    Session,
    /// Forwarded without credentials
    Public,
}

/// Declarative description of one forwarded route
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    pub verb: Verb,
    /// Local path below `/api`, in axum syntax
    pub path: String,
    /// Upstream path template; `{name}` takes the matching path parameter
    pub upstream: String,
    pub body: BodyMode,
    pub access: Access,
    pub validator: Option<Validator>,
    /// Log tag, e.g. `PATCH /api/users/{id}`
    pub tag: String,
}

impl ProxyRoute {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        let path = path.into();
        let body = match verb {
            Verb::Post | Verb::Patch => BodyMode::Json,
            Verb::Get | Verb::Delete => BodyMode::None,
        };
        Self {
            verb,
            upstream: path.clone(),
            tag: format!("{verb} /api{path}"),
            path,
            body,
            access: Access::Session,
            validator: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Verb::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Verb::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Verb::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Verb::Delete, path)
    }

    /// Forward to a different upstream path than the local one
    pub fn upstream(mut self, template: impl Into<String>) -> Self {
        self.upstream = template.into();
        self
    }

    pub fn body(mut self, mode: BodyMode) -> Self {
        self.body = mode;
        self
    }

    pub fn public(mut self) -> Self {
        self.access = Access::Public;
        self
    }

    pub fn validated(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Run `route` for one request. Never fails: every error becomes a JSON
/// response logged under the route's tag.
pub async fn forward(route: &ProxyRoute, state: AppState, request: Request) -> Response {
    match relay(route, &state, request).await {
        Ok(reply) => {
            if reply.status.is_server_error() {
                tracing::warn!(route = %route.tag, status = %reply.status, "Relaying upstream error");
            }
            reply.into_response()
        }
        Err(e) => e.into_logged_response(&route.tag),
    }
}

async fn relay(
    route: &ProxyRoute,
    state: &AppState,
    request: Request,
) -> Result<UpstreamReply, AppError> {
    state.upstream.ensure_configured()?;

    let (mut parts, body) = request.into_parts();

    let bearer = match route.access {
        Access::Session => {
            let jar = CookieJar::from_headers(&parts.headers);
            let token = cookies::read(&jar, ACCESS_TOKEN_COOKIE)
                .ok_or(AppError::Unauthenticated(ACCESS_TOKEN_COOKIE))?;
            Some(token)
        }
        Access::Public => None,
    };

    let params = path_params(&mut parts).await;
    let payload = read_payload(body, route.body, route.validator).await?;
    let url = state
        .upstream
        .endpoint(&route.upstream, &params, parts.uri.query())?;

    state
        .upstream
        .send(UpstreamCall {
            method: route.verb.method(),
            url,
            bearer: bearer.as_deref(),
            body: payload.as_ref(),
            request_id: RequestId::of(&parts.extensions),
        })
        .await
}

async fn path_params(parts: &mut Parts) -> Vec<(String, String)> {
    match parts.extract::<RawPathParams>().await {
        Ok(params) => params
            .iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Read and, when a validator is given, check a JSON request body.
///
/// Validated bodies that are not JSON are a 400 like any other schema
/// failure; for unvalidated bodies it is an internal error.
pub async fn read_payload(
    body: Body,
    mode: BodyMode,
    validator: Option<Validator>,
) -> Result<Option<JsonValue>, AppError> {
    if mode == BodyMode::None {
        return Ok(None);
    }

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read request body: {e}")))?;

    if mode == BodyMode::OptionalJson && bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let Some(validator) = validator else {
        return Ok(Some(serde_json::from_slice(&bytes)?));
    };

    let value: JsonValue = serde_json::from_slice(&bytes)
        .map_err(|_| AppError::Validation(FieldErrors::body("Cuerpo JSON inválido")))?;
    validator(&value).map_err(AppError::Validation)?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::{LoginRequest, validate_as};
    use serde_json::json;

    #[test]
    fn body_mode_follows_verb() {
        assert_eq!(ProxyRoute::get("/roles").body, BodyMode::None);
        assert_eq!(ProxyRoute::delete("/roles/{id}").body, BodyMode::None);
        assert_eq!(ProxyRoute::post("/roles").body, BodyMode::Json);
        assert_eq!(ProxyRoute::patch("/roles/{id}").body, BodyMode::Json);
    }

    #[test]
    fn tag_names_method_and_local_path() {
        let route = ProxyRoute::patch("/users/{id}/change-password");
        assert_eq!(route.tag, "PATCH /api/users/{id}/change-password");
        assert_eq!(route.upstream, route.path);
        assert_eq!(route.access, Access::Session);
    }

    #[tokio::test]
    async fn optional_body_may_be_empty() {
        let payload = read_payload(Body::from("  "), BodyMode::OptionalJson, None)
            .await
            .unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn required_body_must_parse() {
        let err = read_payload(Body::empty(), BodyMode::Json, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }

    #[tokio::test]
    async fn body_is_kept_verbatim() {
        let raw = json!({"name": "Piso 2", "extra": {"nested": [1, 2]}});
        let payload = read_payload(Body::from(raw.to_string()), BodyMode::Json, None)
            .await
            .unwrap();
        assert_eq!(payload, Some(raw));
    }

    #[tokio::test]
    async fn validated_body_reports_fields() {
        let err = read_payload(
            Body::from(r#"{"email":"x"}"#),
            BodyMode::Json,
            Some(validate_as::<LoginRequest>),
        )
        .await
        .unwrap_err();
        match err {
            AppError::Validation(details) => assert!(details.get("email").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn validated_garbage_is_a_validation_error() {
        let err = read_payload(
            Body::from("not json"),
            BodyMode::Json,
            Some(validate_as::<LoginRequest>),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
