//! Authentication error types.

use thiserror::Error;
use vigia_core::error::VigiaError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no user registered for that email")]
    UserNotFound,

    /// Malformed, unknown, or already-consumed code.
    #[error("invalid reset code")]
    InvalidCode,

    /// The code exists but its validity window has lapsed. The caller
    /// should be redirected to request a fresh one, not to retry.
    #[error("reset code has expired")]
    ExpiredCode,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("notification delivery failed: {0}")]
    Delivery(String),

    #[error("cryptography error: {0}")]
    Crypto(String),

    /// Unexpected storage failure. Propagated as-is, never reclassified
    /// into one of the flow errors above.
    #[error(transparent)]
    Store(#[from] VigiaError),
}
