//! Normalizing upstream responses before they are handed back to the browser

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value as JsonValue, json};

/// An upstream answer, reduced to what the gateway relays
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    /// `None` only for 204 No Content
    pub body: Option<JsonValue>,
}

impl UpstreamReply {
    /// Drain a reqwest response into a relayable reply.
    pub async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;

        Ok(Self {
            status,
            body: normalize_body(status, content_type.as_deref(), &bytes),
        })
    }
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

/// Turn an upstream body into JSON for the caller.
///
/// Bodies are parsed as JSON whatever the declared content type, since the
/// upstream is known to mislabel some responses. Anything unparseable is
/// wrapped as `{"raw": text}` so the caller always receives JSON.
pub fn normalize_body(
    status: StatusCode,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Option<JsonValue> {
    if status == StatusCode::NO_CONTENT {
        return None;
    }

    let declared_json = content_type.is_some_and(is_json);
    match serde_json::from_slice::<JsonValue>(bytes) {
        Ok(value) => {
            if !declared_json {
                tracing::debug!(?content_type, "Upstream sent JSON without a JSON content type");
            }
            Some(value)
        }
        Err(e) => {
            if declared_json {
                tracing::warn!(error = %e, "Upstream declared JSON but sent something else");
            }
            Some(json!({"raw": String::from_utf8_lossy(bytes)}))
        }
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
