use super::common::{created_response, no_content_response, ListParams};
use crate::{
    entities::brand,
    errors::{ErrorResponse, ServiceError},
    services::{brands::BrandInput, ListResponse},
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
    path = "/api/v1/brand",
    tag = "Brands",
    request_body = BrandInput,
    responses(
        (status = 201, description = "Brand created", body = ApiResponse<brand::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn create_brand(
    State(state): State<AppState>,
    Json(input): Json<BrandInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let brand = state.services.brands.create(input).await?;
    Ok(created_response(brand))
}

#[utoipa::path(
    get,
    path = "/api/v1/brand/{id}",
    tag = "Brands",
    params(("id" = i32, Path, description = "Brand id")),
    responses(
        (status = 200, description = "Brand found", body = ApiResponse<brand::Model>),
        (status = 404, description = "Brand not found", body = ErrorResponse),
    )
)]
pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<brand::Model> {
    let brand = state.services.brands.get(id).await?;
    Ok(Json(ApiResponse::success(brand)))
}

#[utoipa::path(
    get,
    path = "/api/v1/brand",
    tag = "Brands",
    params(ListParams),
    responses(
        (status = 200, description = "Brands", body = ApiResponse<ListResponse<brand::Model>>),
    )
)]
pub async fn list_brands(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<brand::Model>> {
    let request = params.resolve(&state.config);
    let page = state.services.brands.list(&request).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/brand/{id}",
    tag = "Brands",
    params(("id" = i32, Path, description = "Brand id")),
    request_body = BrandInput,
    responses(
        (status = 200, description = "Brand updated", body = ApiResponse<brand::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Brand not found", body = ErrorResponse),
    )
)]
pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<BrandInput>,
) -> ApiResult<brand::Model> {
    let brand = state.services.brands.update(id, input).await?;
    Ok(Json(ApiResponse::success(brand)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/brand/{id}",
    tag = "Brands",
    params(("id" = i32, Path, description = "Brand id")),
    responses(
        (status = 204, description = "Brand deleted"),
        (status = 404, description = "Brand not found", body = ErrorResponse),
        (status = 409, description = "Brand still referenced by products", body = ErrorResponse),
    )
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.brands.delete(id).await?;
    Ok(no_content_response())
}

pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/:id", get(get_brand).put(update_brand).delete(delete_brand))
}
