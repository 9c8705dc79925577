//! Errors produced while issuing or verifying tokens.
//!
//! [`Invalid`] and [`Expired`] are kept apart so callers can tell a caller
//! that must log in again from a request that should be rejected outright.
//!
//!  [`Invalid`]: TokenError::Invalid
//!  [`Expired`]: TokenError::Expired
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    /// Key material rejected at construction time.
    #[error("invalid token configuration: {0}")]
    Configuration(String),
    #[error("token duration must be positive")]
    InvalidDuration,
    #[error("token is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("cannot encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

impl PartialEq for TokenError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Configuration(a), Self::Configuration(b)) => a == b,
            (Self::InvalidDuration, Self::InvalidDuration) => true,
            (Self::Invalid, Self::Invalid) => true,
            (Self::Expired, Self::Expired) => true,
            (Self::Encoding(a), Self::Encoding(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
