pub mod otp;
pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::DatabaseError;
use crate::types::Role;
use crate::validation::FieldError;

pub use otp::{generate_otp, verify_otp};
pub use password::{hash_password, verify_password, MIN_PASSWORD_LEN};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token generation failed: {0}")]
    Token(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired OTP")]
    InvalidOtp,

    #[error("password shorter than {0} characters")]
    WeakPassword(usize),

    #[error("hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Validation(#[from] FieldError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, role: Role, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp,
        }
    }
}

/// Sign an HS256 token for the user
pub fn issue_token(user_id: Uuid, role: Role, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::Token("JWT secret not configured".to_string()));
    }

    let claims = Claims::new(user_id, role, security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key).map_err(|e| AuthError::Token(e.to_string()))
}

/// Verify signature and expiry, returning the claims
pub fn decode_token(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::Token("JWT secret not configured".to_string()));
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}
