//! Session tokens
//!
//! HS256 JWTs carrying the account id, username and role. Keys are derived
//! once from the secret; expiry is checked without leeway.

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

const DEFAULT_TTL_HOURS: i64 = 24;

pub struct JwtHandler {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtHandler {
    pub fn new(secret: String) -> Self {
        Self::with_expiration(secret, DEFAULT_TTL_HOURS)
    }

    /// Tokens live `expiration_hours` (at least one hour).
    pub fn with_expiration(secret: String, expiration_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(expiration_hours.max(1)),
        }
    }

    /// Returns the signed token and its lifetime in seconds.
    pub fn generate_token(&self, user: &User) -> Result<(String, usize)> {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .context("Token expiry out of range")?;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            exp: expires_at.timestamp() as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Failed to sign session token")?;

        debug!(
            user = %user.username,
            role = user.role.as_str(),
            "Issued session token"
        );
        Ok((token, self.ttl.num_seconds() as usize))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .context("Invalid or expired token")?;
        Ok(data.claims)
    }
}
