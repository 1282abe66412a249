//! Session cookies and the optimistic expiry check used by the dashboard gate.
//!
//! The access token is decoded without verifying its signature. The result
//! only decides whether to rotate early; the upstream API still validates
//! the token on every proxied call.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::TokenError;

/// Cookie holding the short-lived bearer credential
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie holding the credential used to mint a new pair
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Access tokens with this many seconds or fewer left are rotated
pub const REFRESH_THRESHOLD_SECS: i64 = 30;

/// Cookie lifetime when the upstream does not send `expiresIn` (7 days)
pub const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

/// Read the `exp` claim (Unix seconds) from a JWT payload.
pub fn token_expiry(token: &str) -> Result<i64, TokenError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(TokenError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claim: ExpiryClaim = serde_json::from_slice(&bytes)?;
    claim.exp.ok_or(TokenError::MissingExpiry)
}

/// Where a dashboard request stands before any refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No refresh cookie: the session is gone
    NoRefreshToken,
    /// Access token present with more than the threshold left
    TokenValid,
    /// Access token absent, unreadable or about to expire
    TokenExpiringOrMissing,
}

/// Classify the session cookies at `now`.
///
/// Empty cookie values count as absent. Any decode failure lands in
/// `TokenExpiringOrMissing`, never in `TokenValid`.
pub fn assess_session(
    access_token: Option<&str>,
    refresh_token: Option<&str>,
    now: DateTime<Utc>,
) -> SessionState {
    if refresh_token.is_none_or(str::is_empty) {
        return SessionState::NoRefreshToken;
    }

    let Some(access_token) = access_token.filter(|t| !t.is_empty()) else {
        return SessionState::TokenExpiringOrMissing;
    };

    match token_expiry(access_token) {
        Ok(exp) if exp - now.timestamp() > REFRESH_THRESHOLD_SECS => SessionState::TokenValid,
        Ok(_) => SessionState::TokenExpiringOrMissing,
        Err(e) => {
            tracing::debug!(error = %e, "Access token unreadable, treating as expired");
            SessionState::TokenExpiringOrMissing
        }
    }
}
