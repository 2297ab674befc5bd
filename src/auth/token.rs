//! Session token codec. Tokens are three base64url segments (header, payload,
//! trailer) joined by `.`. The trailer is a fixed placeholder, so a token only
//! proves structure and lifetime; trust decisions belong to the remote authority.

use crate::auth::types::{Role, User};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Lifetime of an issued token, in seconds.
pub const TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

const PLACEHOLDER_TRAILER: &[u8] = b"unsigned";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl TokenHeader {
    fn unsigned() -> Self {
        Self {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPayload {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Current wall clock as Unix seconds.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

/// Issue a token for `user` at `issued_at` (Unix seconds).
///
/// The output is deterministic for the same user and issue time.
///
/// # Errors
///
/// Returns an error if the header or payload cannot be encoded as JSON.
pub fn encode(user: &User, issued_at: i64) -> Result<String, TokenError> {
    let payload = TokenPayload {
        user_id: user.id,
        username: user.username.clone(),
        role: user.role,
        iat: issued_at,
        exp: issued_at.saturating_add(TOKEN_TTL_SECONDS),
    };

    let header_b64 = b64e_json(&TokenHeader::unsigned())?;
    let payload_b64 = b64e_json(&payload)?;
    let trailer_b64 = Base64UrlUnpadded::encode_string(PLACEHOLDER_TRAILER);

    Ok(format!("{header_b64}.{payload_b64}.{trailer_b64}"))
}

/// Decode the payload of a token without any I/O or trust check.
///
/// # Errors
///
/// Returns an error if:
/// - the token does not have exactly three non-empty segments,
/// - a segment is not base64url,
/// - the header or payload JSON cannot be parsed.
pub fn decode(token: &str) -> Result<TokenPayload, TokenError> {
    let mut parts = token.trim().split('.');
    let header_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
    let payload_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
    let trailer_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
    if parts.next().is_some() || [header_b64, payload_b64, trailer_b64].contains(&"") {
        return Err(TokenError::TokenFormat);
    }

    let _header: TokenHeader = b64d_json(header_b64)?;
    Base64UrlUnpadded::decode_vec(trailer_b64).map_err(|_| TokenError::Base64)?;

    b64d_json(payload_b64)
}

/// Decode a token and reject it once `exp` lies before `now`.
///
/// # Errors
///
/// Returns the decode error, or `TokenError::Expired`.
pub fn validate(token: &str, now: i64) -> Result<TokenPayload, TokenError> {
    let payload = decode(token)?;
    if payload.exp < now {
        return Err(TokenError::Expired);
    }
    Ok(payload)
}

/// True when the token is expired at `now`, or cannot be decoded at all.
#[must_use]
pub fn is_expired(token: &str, now: i64) -> bool {
    validate(token, now).is_err()
}
