//! JWT Token Handler
//! Mission: Issue and verify signed, time-limited session tokens

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

/// Session token lifetime in hours.
const TOKEN_LIFETIME_HOURS: i64 = 2;

/// Token verification failures. Expiry is kept distinct so the API layer
/// can report it separately from a bad signature.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// JWT handler for token operations. The same symmetric secret issues and
/// verifies; tokens are self-certifying (signature + embedded expiry), no
/// store lookup happens during verification.
pub struct JwtHandler {
    secret: String,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with the shared signing secret.
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            expiration_hours: TOKEN_LIFETIME_HOURS,
        }
    }

    /// Generate a session token for a user.
    ///
    /// Returns the signed token and its lifetime in seconds. Claims embed
    /// the identity triple {user id, email, role} plus an absolute expiry.
    pub fn generate_token(&self, user: &User) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.expiration_hours))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let expires_in = (self.expiration_hours * 3600) as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            exp: expiration,
        };

        debug!(
            "Generating JWT for {} ({}), expires in {}h",
            user.email, user.id, self.expiration_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")?;

        Ok((token, expires_in))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0; // expiry is exact, no grace window

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        debug!("Validated JWT for {}", decoded.claims.email);

        Ok(decoded.claims)
    }
}
