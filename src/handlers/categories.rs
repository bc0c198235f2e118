use super::common::{created_response, no_content_response, ListParams};
use crate::{
    entities::category,
    errors::{ErrorResponse, ServiceError},
    services::{categories::CategoryInput, ListResponse},
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
    path = "/api/v1/category",
    tag = "Categories",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<category::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.categories.create(input).await?;
    Ok(created_response(category))
}

#[utoipa::path(
    get,
    path = "/api/v1/category/{id}",
    tag = "Categories",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<category::Model>),
        (status = 404, description = "Category not found", body = ErrorResponse),
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<category::Model> {
    let category = state.services.categories.get(id).await?;
    Ok(Json(ApiResponse::success(category)))
}

#[utoipa::path(
    get,
    path = "/api/v1/category",
    tag = "Categories",
    params(ListParams),
    responses(
        (status = 200, description = "Categories", body = ApiResponse<ListResponse<category::Model>>),
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<category::Model>> {
    let request = params.resolve(&state.config);
    let page = state.services.categories.list(&request).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/category/{id}",
    tag = "Categories",
    params(("id" = i32, Path, description = "Category id")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<category::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<CategoryInput>,
) -> ApiResult<category::Model> {
    let category = state.services.categories.update(id, input).await?;
    Ok(Json(ApiResponse::success(category)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/category/{id}",
    tag = "Categories",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category still referenced by products", body = ErrorResponse),
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.categories.delete(id).await?;
    Ok(no_content_response())
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", get(get_category).put(update_category).delete(delete_category))
}
