//! JSON extractor with automatic validation using the validator crate.

use crate::errors::{AppError, FieldErrors, fields::pascal_case};
use axum::{
    extract::{FromRequest, Json, Request, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Bodies that parse as JSON but do not fit `T` (missing field, wrong type,
/// `null` for a required value) and bodies failing `Validate` are both
/// rejected with a 400 [`FieldErrors`] map keyed by PascalCase field name,
/// e.g. `{"Name": ["..."]}`. Other rejections (syntax, content type) go
/// through [`AppError::JsonExtractorRejection`].
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct SaveProduct {
///     #[validate(length(min = 1, max = 255))]
///     name: String,
/// }
///
/// async fn create(ValidatedJson(payload): ValidatedJson<SaveProduct>) -> String {
///     format!("Creating {}", payload.name)
/// }
///
/// let app = Router::new().route("/products", post(create));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                JsonRejection::JsonDataError(e) => {
                    AppError::Fields(data_error_fields(&e.body_text())).into_response()
                }
                other => AppError::JsonExtractorRejection(other).into_response(),
            })?;

        data.validate()
            .map_err(|e| AppError::Fields(FieldErrors::from(&e)).into_response())?;

        Ok(ValidatedJson(data))
    }
}

/// Map a deserialization message to the offending top-level field.
///
/// The message reads `<prefix>: missing field `name` ...` when the field is
/// absent and `<prefix>: categoryId: invalid type: ...` when the value does
/// not fit. Anything else is reported against `$`, the body itself.
fn data_error_fields(text: &str) -> FieldErrors {
    let detail = text
        .split_once("target type: ")
        .map_or(text, |(_, detail)| detail);

    if let Some(rest) = detail.strip_prefix("missing field `") {
        if let Some((field, _)) = rest.split_once('`') {
            let field = pascal_case(field);
            let message = format!("The {} field is required.", field);
            return FieldErrors::single(field, message);
        }
    }

    let located = detail
        .split_once(": ")
        .filter(|(path, _)| !path.contains(' '))
        .and_then(|(path, reason)| {
            let top = path.split(['.', '[']).next().unwrap_or_default();
            (!top.is_empty()).then_some((top, reason))
        });

    match located {
        Some((top, reason)) => {
            let field = pascal_case(top);
            let message = if reason.starts_with("invalid type: null") {
                format!("The {} field is required.", field)
            } else {
                format!("The value is not valid for {}.", field)
            };
            FieldErrors::single(field, message)
        }
        None => FieldErrors::single("$", "The JSON value could not be converted."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        #[validate(length(min = 1, message = "The Name field is required."))]
        name: String,
        #[serde(default)]
        category_id: i32,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            post(|ValidatedJson(p): ValidatedJson<Payload>| async move {
                format!("{}:{}", p.name, p.category_id)
            }),
        )
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let response = app().oneshot(post_json(r#"{"name":"Widget"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_body_returns_field_errors() {
        let response = app().oneshot(post_json(r#"{"name":""}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"Name": ["The Name field is required."]}));
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let response = app().oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    async fn field_errors(body: &str) -> Value {
        let response = app().oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_is_reported_as_required() {
        assert_eq!(
            field_errors(r#"{"categoryId":3}"#).await,
            json!({"Name": ["The Name field is required."]})
        );
    }

    #[tokio::test]
    async fn test_mistyped_field_is_keyed_by_field() {
        assert_eq!(
            field_errors(r#"{"name":"Widget","categoryId":"3"}"#).await,
            json!({"CategoryId": ["The value is not valid for CategoryId."]})
        );
    }

    #[tokio::test]
    async fn test_null_for_required_value_is_reported_as_required() {
        assert_eq!(
            field_errors(r#"{"name":"Widget","categoryId":null}"#).await,
            json!({"CategoryId": ["The CategoryId field is required."]})
        );
    }

    #[tokio::test]
    async fn test_non_object_body_is_reported_against_the_body() {
        let body = field_errors("42").await;
        assert!(body.get("$").is_some(), "unexpected body: {}", body);
    }

    #[test]
    fn test_data_error_fields_uses_top_level_segment() {
        let errors = data_error_fields(
            "Failed to deserialize the JSON body into the target type: \
             tags[0]: invalid type: integer `1`, expected a string at line 1 column 9",
        );
        assert_eq!(errors.field_names(), vec!["Tags"]);
    }
}
