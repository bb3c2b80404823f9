//! Reusable OpenAPI response types for consistent API documentation.

use super::{ErrorResponse, FieldErrors};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "code": 1005,
        "error": "INTERNAL_ERROR",
        "message": "An internal server error occurred"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Field validation failed",
    content_type = "application/json",
    example = json!({
        "CategoryId": ["Invalid CategoryId"]
    })
)]
pub struct FieldErrorsResponse(pub FieldErrors);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Invalid path parameter",
    content_type = "application/json",
    example = json!({
        "code": 1002,
        "error": "INVALID_PATH",
        "message": "Invalid id: abc"
    })
)]
pub struct BadRequestPathResponse(pub ErrorResponse);
