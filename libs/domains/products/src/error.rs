use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, FieldErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    /// A payload field failed a semantic check (e.g. unknown category)
    #[error("Invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("Product not found: {0}")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    pub fn invalid_category() -> Self {
        ProductError::InvalidField {
            field: "CategoryId",
            message: "Invalid CategoryId".to_string(),
        }
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::InvalidField { field, message } => {
                AppError::Fields(FieldErrors::single(field, message))
            }
            ProductError::NotFound(_) => AppError::Status(StatusCode::NOT_FOUND),
            ProductError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for ProductError {
    fn from(err: sea_orm::DbErr) -> Self {
        ProductError::Database(err.to_string())
    }
}
