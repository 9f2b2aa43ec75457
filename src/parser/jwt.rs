use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Why a token could not be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTokenError {
    #[error("token is empty")]
    Empty,
    #[error("invalid token format: expected 3 segments, got {0}")]
    Segments(usize),
    #[error("failed to decode token payload: {0}")]
    Base64(String),
    #[error("failed to parse token claims: {0}")]
    Claims(String),
    #[error("token does not contain an expiration time")]
    MissingExpiry,
    #[error("token expiration {0} is out of range")]
    ExpiryOutOfRange(i64),
}

// jwt token
#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    #[serde(default)]
    pub exp: i64,
}

fn decode_jwt_from_string(token_string: &str) -> Result<JwtClaims, InvalidTokenError> {
    if token_string.is_empty() {
        return Err(InvalidTokenError::Empty);
    }
    let parts: Vec<&str> = token_string.split('.').collect();
    if parts.len() != 3 {
        return Err(InvalidTokenError::Segments(parts.len()));
    }

    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| InvalidTokenError::Base64(e.to_string()))?;

    serde_json::from_slice::<JwtClaims>(&decoded)
        .map_err(|e| InvalidTokenError::Claims(e.to_string()))
}

/// Reads the `exp` claim of a dot-separated signed token.
///
/// The signature is NOT verified. The result only paces refreshes and must never be
/// used to decide whether a token is trustworthy.
pub fn expiry_of(token: &str) -> Result<DateTime<Utc>, InvalidTokenError> {
    let claims = decode_jwt_from_string(token)?;
    if claims.exp == 0 {
        return Err(InvalidTokenError::MissingExpiry);
    }
    DateTime::from_timestamp(claims.exp, 0).ok_or(InvalidTokenError::ExpiryOutOfRange(claims.exp))
}
