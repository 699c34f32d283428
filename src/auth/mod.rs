pub mod policy;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::types::Role;

pub use policy::{AccessDenied, AccessPolicy, Endpoint, OwnedByUser};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identity
    pub sub: Uuid,
    pub access: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, access: Role, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            access,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Bearer token format")]
    NotBearer,

    #[error("Empty JWT token")]
    EmptyToken,

    #[error("JWT token has expired")]
    Expired,

    #[error("Invalid JWT token: {0}")]
    Invalid(String),
}

/// HS256 signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: u64,
}

impl JwtKeys {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, JwtError> {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    /// Sign a token for `user_id` with the configured lifetime.
    pub fn issue(&self, user_id: Uuid, access: Role) -> Result<String, JwtError> {
        self.sign(&Claims::new(user_id, access, self.expiry_hours))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

/// Read a token's claims without the signing key. Expiry is still enforced.
///
/// Only for deciding what a client should show; the server always verifies.
pub fn peek_claims(token: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

/// Pull the token out of an `Authorization` header value.
pub fn bearer_token(header: &str) -> Result<&str, JwtError> {
    let token = header.strip_prefix("Bearer ").ok_or(JwtError::NotBearer)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(JwtError::EmptyToken);
    }
    Ok(token)
}
