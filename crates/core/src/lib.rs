//! clinic-core: session, token and request-schema logic for the clinic gateway
//!
//! Nothing in this crate performs I/O. The server crate feeds it cookie
//! values and upstream bodies and acts on the answers.

pub mod error;
pub mod payload;
pub mod resource;
pub mod session;
pub mod tokens;

pub use error::TokenError;
pub use payload::{
    CreateUserRequest, FieldErrors, LoginRequest, RegisterRequest, Validator, validate_as,
};
pub use resource::Resource;
pub use session::{
    ACCESS_TOKEN_COOKIE, DEFAULT_SESSION_MAX_AGE_SECS, REFRESH_THRESHOLD_SECS,
    REFRESH_TOKEN_COOKIE, SessionState, assess_session, token_expiry,
};
pub use tokens::TokenPair;
