//! JWT issuing and validation
//!
//! HS512 tokens with jti/sub/email/iat/exp/iss/aud claims. The codec also
//! exposes a signature-only parse used by the deny-list check, where an
//! expired token still needs its jti read.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;

/// JWT claims carried by SportsHub tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token id, fresh uuid per token
    pub jti: String,
    /// Subject: user id
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued-at unix timestamp
    pub iat: i64,
    /// Expiry unix timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// Issues and validates HS512 bearer tokens
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    expiration_minutes: i64,
}

impl TokenCodec {
    /// Create a codec from JWT configuration
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            expiration_minutes: config.expiration_minutes,
        }
    }

    /// Issue a token for the given user
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String> {
        let now = chrono::Utc::now().timestamp();

        let claims = Claims {
            jti: Uuid::new_v4().simple().to_string(),
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + self.expiration_minutes * 60,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .context("Failed to encode JWT")
    }

    /// Fully validate a token: signature, expiry, issuer and audience.
    ///
    /// # Errors
    ///
    /// Returns an error for any invalid, expired or mis-issued token.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Invalid bearer token")?;
        Ok(data.claims)
    }

    /// Parse claims checking only the signature. Expiry, issuer and audience
    /// are ignored so sign-out and the deny-list check can read the jti of a
    /// token that standard validation would reject.
    pub fn parse_claims(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Malformed bearer token")?;
        Ok(data.claims)
    }
}

/// Extract the raw token from an `Authorization: Bearer <token>` header value
pub fn strip_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
