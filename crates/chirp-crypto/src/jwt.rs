use chirp_core::{ChirpError, ChirpResult};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// How long a session bearer token stays valid.
pub const SESSION_TTL_SECS: i64 = 2 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Create an HS256 session token for `account_id`.
pub fn create_session_token(account_id: &str, secret: &str) -> ChirpResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: account_id.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| ChirpError::Auth(e.to_string()))
}

pub fn validate_session_token(token: &str, secret: &str) -> ChirpResult<SessionClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    decode::<SessionClaims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| ChirpError::Auth(e.to_string()))
}
