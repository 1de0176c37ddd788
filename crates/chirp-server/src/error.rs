use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chirp_core::{ChirpError, FieldErrors};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_name: String,
    pub message: String,
    pub fields: Option<FieldErrors>,
    /// Sent with `Retry-After` so clients know the request may be repeated.
    pub retryable: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, error_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_name: error_name.into(),
            message: message.into(),
            fields: None,
            retryable: false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.error_name,
            "message": self.message,
        });
        if let Some(fields) = self.fields {
            body["fields"] = json!(fields);
        }
        let mut response = (self.status, axum::Json(body)).into_response();
        if self.retryable {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}

impl From<ChirpError> for ApiError {
    fn from(err: ChirpError) -> Self {
        let retryable = err.is_retryable();
        let mut api_error = match err {
            ChirpError::Validation(fields) => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error_name: "ValidationFailed".to_string(),
                message: format!("validation failed: {fields}"),
                fields: Some(fields),
                retryable: false,
            },
            ChirpError::Forbidden(_) => {
                ApiError::new(StatusCode::FORBIDDEN, "Forbidden", err.to_string())
            }
            ChirpError::Auth(_) => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                err.to_string(),
            ),
            ChirpError::InvalidCredentials => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "InvalidCredentials",
                err.to_string(),
            ),
            ChirpError::AccountNotActivated => ApiError::new(
                StatusCode::FORBIDDEN,
                "AccountNotActivated",
                "account has not been activated, check your email for the confirmation link",
            ),
            ChirpError::NotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, "NotFound", err.to_string())
            }
            ChirpError::Storage(_) => {
                tracing::error!("storage failure: {err}");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "StorageUnavailable",
                    "storage is unavailable, the request may or may not have been applied",
                )
            }
            ChirpError::Notification(_) => {
                ApiError::new(StatusCode::BAD_GATEWAY, "NotificationFailed", err.to_string())
            }
            ChirpError::Crypto(_) => {
                tracing::error!("internal failure: {err}");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "internal server error",
                )
            }
        };
        api_error.retryable = retryable;
        api_error
    }
}
