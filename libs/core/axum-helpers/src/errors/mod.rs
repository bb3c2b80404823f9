pub mod codes;
pub mod fields;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;
pub use fields::FieldErrors;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Standard error response structure.
///
/// Returned for every error that is not a field-level validation failure
/// or a bare status:
/// - `code`: Integer error code for logging/monitoring (e.g., 1004)
/// - `error`: Machine-readable error identifier (e.g., "NOT_FOUND")
/// - `message`: Human-readable error message
/// - `details`: Optional additional error details
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1002,
///   "error": "INVALID_PATH",
///   "message": "Invalid id: abc",
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Field-keyed validation failures, rendered as `{"Field": ["message"]}`
    #[error("Invalid fields: {0}")]
    Fields(FieldErrors),

    /// A status code with an empty body
    #[error("{0}")]
    Status(StatusCode),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AppError::Fields(fields) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    fields = ?fields.field_names(),
                    "Validation failed"
                );
                return (StatusCode::BAD_REQUEST, Json(fields)).into_response();
            }
            AppError::Status(status) => {
                tracing::info!(status = status.as_u16(), "Responding with empty body");
                return status.into_response();
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                (e.status(), e.body_text(), ErrorCode::JsonExtraction)
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg, ErrorCode::InvalidPath)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError.default_message().to_string(),
                    ErrorCode::InternalError,
                )
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// Build a JSON error response outside of [`AppError`].
///
/// # Example
///
/// ```rust,ignore
/// use axum_helpers::errors::{ErrorCode, error_response};
/// use axum::http::StatusCode;
///
/// let response = error_response(
///     StatusCode::METHOD_NOT_ALLOWED,
///     "Use GET",
///     ErrorCode::MethodNotAllowed,
/// );
/// ```
pub fn error_response(
    status: StatusCode,
    message: impl Into<String>,
    error_code: ErrorCode,
) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_field_errors_render_as_bare_map() {
        let error = AppError::Fields(FieldErrors::single("CategoryId", "Invalid CategoryId"));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"CategoryId": ["Invalid CategoryId"]})
        );
    }

    #[tokio::test]
    async fn test_status_renders_empty_body() {
        let response = AppError::Status(StatusCode::NOT_FOUND).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_bad_request_uses_error_response() {
        let response = AppError::BadRequest("Invalid id: abc".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], 1002);
        assert_eq!(body["error"], "INVALID_PATH");
        assert_eq!(body["message"], "Invalid id: abc");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let response =
            AppError::InternalServerError("connection reset by peer".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "An internal server error occurred");
    }
}
