//! Stateless bearer tokens bound to a user id.
//!
//! Tokens are HS256-signed compact JWS strings. Verification needs nothing but
//! the symmetric key the [`TokenMaker`] was built with, so there is no session
//! store and no way to revoke a token before it expires.
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

pub use error::TokenError;
pub use payload::Payload;

mod error;
mod payload;

/// Minimum key length accepted by [`TokenMaker::new`] (the HS256 block of
/// 256 bits).
pub const MIN_SECRET_KEY_SIZE: usize = 32;

/// Issues and verifies tokens with one immutable symmetric key.
pub struct TokenMaker {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenMaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMaker").finish_non_exhaustive()
    }
}

impl TokenMaker {
    /// Build a maker from raw key bytes.
    ///
    /// Fails with [`TokenError::Configuration`] when the key is shorter than
    /// [`MIN_SECRET_KEY_SIZE`].
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_KEY_SIZE {
            return Err(TokenError::Configuration(format!(
                "symmetric key must be at least {MIN_SECRET_KEY_SIZE} bytes, got {}",
                secret.len()
            )));
        }

        // Expiry is checked against our own payload, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Issue a token for `user_id`, valid for `duration` from now.
    pub fn create_token(
        &self,
        user_id: i64,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        self.create_token_at(user_id, duration, Utc::now())
    }

    pub fn create_token_at(
        &self,
        user_id: i64,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(user_id, duration, now)?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(TokenError::Encoding)?;
        Ok((token, payload))
    }

    /// Check that `token` was signed with this key and has not expired.
    pub fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        self.verify_token_at(token, Utc::now())
    }

    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Payload, TokenError> {
        let data = jsonwebtoken::decode::<Payload>(token, &self.decoding, &self.validation)
            .map_err(|err| {
                tracing::debug!("token rejected: {err}");
                TokenError::Invalid
            })?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}
