use axum::Extension;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;

use crate::error::ApiError;

/// The session signing secret, added as an Axum Extension.
#[derive(Clone)]
pub struct SessionSecret(pub String);

/// The account id carried by a valid bearer token.
///
/// This only proves the token is genuine; handlers resolve it to an actor
/// through the lifecycle so the account is re-checked on every request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub account_id: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(secret) = Extension::<SessionSecret>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "session secret not configured",
                )
            })?;

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::new(
                    StatusCode::UNAUTHORIZED,
                    "AuthenticationRequired",
                    "Missing authorization header",
                )
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                "Invalid authorization format",
            )
        })?;

        let claims = chirp_crypto::validate_session_token(token, &secret.0).map_err(|e| {
            if e.to_string().contains("ExpiredSignature") {
                ApiError::new(StatusCode::UNAUTHORIZED, "ExpiredToken", "Token has expired")
            } else {
                ApiError::new(StatusCode::UNAUTHORIZED, "InvalidToken", "Invalid token")
            }
        })?;

        Ok(AuthenticatedUser {
            account_id: claims.sub,
        })
    }
}
