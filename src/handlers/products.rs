use super::common::{created_response, no_content_response, ListParams};
use crate::{
    entities::product,
    errors::{ErrorResponse, ServiceError},
    services::{products::{ProductDetails, ProductInput}, ListResponse},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

#[utoipa::path(
    post,
    path = "/api/v1/product",
    tag = "Products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.create(input).await?;
    Ok(created_response(product))
}

#[utoipa::path(
    get,
    path = "/api/v1/product/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductDetails>),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ProductDetails> {
    let product = state.services.products.get(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    get,
    path = "/api/v1/product",
    tag = "Products",
    params(ListParams),
    responses(
        (status = 200, description = "Products", body = ApiResponse<ListResponse<product::Model>>),
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<product::Model>> {
    let request = params.resolve(&state.config);
    let page = state.services.products.list(&request).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/product/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<ProductInput>,
) -> ApiResult<product::Model> {
    let product = state.services.products.update(id, input).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/product/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Product is still stocked or ordered", body = ErrorResponse),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete(id).await?;
    Ok(no_content_response())
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
}
