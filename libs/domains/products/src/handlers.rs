use axum::{
    Json, Router,
    extract::{OriginalUri, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    IdPath, ValidatedJson,
    errors::responses::{BadRequestPathResponse, FieldErrorsResponse, InternalServerErrorResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::controller::ProductsController;
use crate::error::ProductResult;
use crate::mapper::ProductMapper;
use crate::models::{ProductResource, SaveProductResource};
use crate::repository::ContextFactory;

pub const TAG: &str = "products";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        get_product,
        create_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(ProductResource, SaveProductResource),
        responses(
            FieldErrorsResponse,
            BadRequestPathResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product catalogue endpoints")
    )
)]
pub struct ApiDoc;

/// Create the product router with all HTTP endpoints
pub fn router<F: ContextFactory>(factory: F) -> Router {
    Router::new()
        .route("/", get(list_products::<F>).post(create_product::<F>))
        .route(
            "/{id}",
            get(get_product::<F>)
                .put(update_product::<F>)
                .delete(delete_product::<F>),
        )
        .with_state(Arc::new(factory))
}

fn controller<F: ContextFactory>(factory: &F) -> ProductsController<F::Repository, F::UnitOfWork> {
    let (repository, unit_of_work) = factory.create_context();
    ProductsController::new(repository, unit_of_work, ProductMapper)
}

/// List all products
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "List of products", body = Vec<ProductResource>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<F: ContextFactory>(
    State(factory): State<Arc<F>>,
) -> ProductResult<Json<Vec<ProductResource>>> {
    let products = controller(&*factory).list_products().await?;
    Ok(Json(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResource),
        (status = 400, response = BadRequestPathResponse),
        (status = 404, description = "Product not found"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<F: ContextFactory>(
    State(factory): State<Arc<F>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<ProductResource>> {
    let product = controller(&*factory).get_product(id).await?;
    Ok(Json(product))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = SaveProductResource,
    responses(
        (status = 201, description = "Product created", body = ProductResource,
            headers(("Location" = String, description = "URL of the new product"))),
        (status = 400, response = FieldErrorsResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<F: ContextFactory>(
    State(factory): State<Arc<F>>,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(payload): ValidatedJson<SaveProductResource>,
) -> ProductResult<impl IntoResponse> {
    let product = controller(&*factory).create_product(payload).await?;
    let location = format!("{}/{}", uri.path().trim_end_matches('/'), product.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(product),
    ))
}

/// Replace a product's fields
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = SaveProductResource,
    responses(
        (status = 204, description = "Product updated"),
        (status = 400, response = FieldErrorsResponse),
        (status = 404, description = "Product not found"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<F: ContextFactory>(
    State(factory): State<Arc<F>>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<SaveProductResource>,
) -> ProductResult<StatusCode> {
    controller(&*factory).update_product(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestPathResponse),
        (status = 404, description = "Product not found"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<F: ContextFactory>(
    State(factory): State<Arc<F>>,
    IdPath(id): IdPath,
) -> ProductResult<StatusCode> {
    controller(&*factory).delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
