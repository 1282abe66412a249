//! HTTP client for the upstream REST API

use std::time::Duration;

use axum::http::Method;
use reqwest::Url;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::middleware::REQUEST_ID_HEADER;
use crate::relay::UpstreamReply;

/// Client for the configured upstream base URL
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

/// One outbound call
pub struct UpstreamCall<'a> {
    pub method: Method,
    pub url: Url,
    pub bearer: Option<&'a str>,
    pub body: Option<&'a JsonValue>,
    pub request_id: Option<&'a str>,
}

impl UpstreamClient {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { http, base_url }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Fail with `MissingApiUrl` unless a base URL is set.
    pub fn ensure_configured(&self) -> Result<(), AppError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(AppError::MissingApiUrl)
        }
    }

    /// Resolve a path template such as `/offices/by-floor/{floorId}` against
    /// the base URL. Placeholders take their value from `params`; every
    /// segment is percent-encoded on the way in.
    pub fn endpoint(
        &self,
        template: &str,
        params: &[(String, String)],
        query: Option<&str>,
    ) -> Result<Url, AppError> {
        let base = self.base_url.as_deref().ok_or(AppError::MissingApiUrl)?;
        let mut url =
            Url::parse(base).map_err(|e| AppError::Internal(format!("Invalid API_URL: {e}")))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::Internal("API_URL cannot carry a path".to_string()))?;
            segments.pop_if_empty();

            for segment in template.split('/').filter(|s| !s.is_empty()) {
                match placeholder(segment) {
                    Some(name) => {
                        let value = params
                            .iter()
                            .find(|(key, _)| key == name)
                            .map(|(_, value)| value.as_str())
                            .ok_or_else(|| {
                                AppError::Internal(format!("Missing path parameter {name}"))
                            })?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }

        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    /// Send a call and normalize whatever comes back.
    pub async fn send(&self, call: UpstreamCall<'_>) -> Result<UpstreamReply, AppError> {
        tracing::debug!(method = %call.method, url = %call.url, "Forwarding to upstream");

        let mut request = self.http.request(call.method, call.url);
        if let Some(token) = call.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(id) = call.request_id {
            request = request.header(REQUEST_ID_HEADER, id);
        }
        if let Some(body) = call.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Ok(UpstreamReply::read(response).await?)
    }

    /// POST a JSON body to a fixed upstream path.
    pub async fn post(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: Option<&JsonValue>,
        request_id: Option<&str>,
    ) -> Result<UpstreamReply, AppError> {
        let url = self.endpoint(path, &[], None)?;
        self.send(UpstreamCall {
            method: Method::POST,
            url,
            bearer,
            body,
            request_id,
        })
        .await
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}
