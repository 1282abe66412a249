use thiserror::Error;

/// Reasons an access token's expiry could not be read
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Malformed,

    #[error("payload is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("payload is not a JSON claims object: {0}")]
    Claims(#[from] serde_json::Error),

    #[error("claims carry no exp")]
    MissingExpiry,
}
