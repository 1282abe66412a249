//! Token pairs returned by the upstream login and refresh endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::session::DEFAULT_SESSION_MAX_AGE_SECS;

/// Access/refresh credentials plus their advertised lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl TokenPair {
    /// Pull a token pair out of an upstream body.
    ///
    /// The upstream wraps most payloads as `{data, statusCode, message,
    /// timestamp}`, but some auth endpoints answer with a bare object, so
    /// `data` is searched first and the top level second. Both tokens must
    /// be non-empty strings.
    pub fn from_envelope(body: &JsonValue) -> Option<Self> {
        [body.get("data"), Some(body)]
            .into_iter()
            .flatten()
            .find_map(Self::from_object)
    }

    fn from_object(value: &JsonValue) -> Option<Self> {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(JsonValue::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        Some(Self {
            access_token: text("accessToken")?,
            refresh_token: text("refreshToken")?,
            expires_in: value.get("expiresIn").and_then(parse_seconds),
        })
    }

    /// Cookie `Max-Age` for this pair, in seconds
    pub fn max_age_secs(&self) -> i64 {
        self.expires_in
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_SESSION_MAX_AGE_SECS)
    }

    /// The same pair with `expires_in` set to the lifetime actually applied
    pub fn with_effective_expiry(self) -> Self {
        let expires_in = Some(self.max_age_secs());
        Self { expires_in, ..self }
    }
}

fn parse_seconds(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_enveloped_data() {
        let body = json!({
            "data": {"accessToken": "a1", "refreshToken": "r1", "expiresIn": 900},
            "statusCode": 200,
            "message": "ok",
            "timestamp": "2025-01-01T00:00:00Z"
        });
        let pair = TokenPair::from_envelope(&body).unwrap();
        assert_eq!(pair.access_token, "a1");
        assert_eq!(pair.refresh_token, "r1");
        assert_eq!(pair.max_age_secs(), 900);
    }

    #[test]
    fn falls_back_to_top_level() {
        let body = json!({"accessToken": "a2", "refreshToken": "r2", "expiresIn": "3600"});
        let pair = TokenPair::from_envelope(&body).unwrap();
        assert_eq!(pair.access_token, "a2");
        assert_eq!(pair.expires_in, Some(3600));
    }

    #[test]
    fn requires_both_tokens() {
        assert!(TokenPair::from_envelope(&json!({"data": {"accessToken": "a"}})).is_none());
        assert!(
            TokenPair::from_envelope(&json!({"accessToken": "", "refreshToken": "r"})).is_none()
        );
        assert!(TokenPair::from_envelope(&json!([1, 2])).is_none());
    }

    #[test]
    fn default_max_age_is_seven_days() {
        let pair = TokenPair::from_envelope(&json!({"accessToken": "a", "refreshToken": "r"}))
            .unwrap();
        assert_eq!(pair.max_age_secs(), 604_800);

        let zero = TokenPair {
            expires_in: Some(0),
            ..pair
        };
        assert_eq!(zero.max_age_secs(), 604_800);
    }

    #[test]
    fn serializes_camel_case() {
        let pair = TokenPair {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_in: None,
        };
        assert_eq!(
            serde_json::to_value(&pair).unwrap(),
            json!({"accessToken": "a", "refreshToken": "r"})
        );
    }

    #[test]
    fn effective_expiry_fills_in_the_default() {
        let pair = TokenPair {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_in: None,
        }
        .with_effective_expiry();
        assert_eq!(
            serde_json::to_value(&pair).unwrap(),
            json!({"accessToken": "a", "refreshToken": "r", "expiresIn": 604_800})
        );

        let advertised = TokenPair {
            expires_in: Some(900),
            ..pair
        };
        assert_eq!(advertised.with_effective_expiry().expires_in, Some(900));
    }
}
