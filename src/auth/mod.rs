use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

/// Bearer token claims issued by the external auth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email: None,
            aud: None,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn with_audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(aud.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    SecretMissing,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    Invalid(String),
}

fn secret(config: &AuthConfig) -> Result<&str, JwtError> {
    config
        .jwt_secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(JwtError::SecretMissing)
}

/// Sign claims with the configured HS256 secret
pub fn generate_jwt(claims: &Claims, config: &AuthConfig) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret(config)?.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature, expiry and (when configured) audience
pub fn validate_jwt(token: &str, config: &AuthConfig) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret(config)?.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    match config.jwt_audience.as_deref() {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::Invalid(e.to_string()))
}

/// Opaque 64-character lowercase hex invite token
pub fn generate_invite_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub fn is_invite_token(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Short digest for log lines; invite tokens are bearer credentials
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{:x}", digest).chars().take(12).collect()
}
