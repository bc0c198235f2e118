use super::common::{created_response, no_content_response, ListParams};
use crate::{
    entities::store,
    errors::{ErrorResponse, ServiceError},
    services::{stores::StoreInput, ListResponse},
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
    path = "/api/v1/store",
    tag = "Stores",
    request_body = StoreInput,
    responses(
        (status = 201, description = "Store created", body = ApiResponse<store::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn create_store(
    State(state): State<AppState>,
    Json(input): Json<StoreInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let store = state.services.stores.create(input).await?;
    Ok(created_response(store))
}

#[utoipa::path(
    get,
    path = "/api/v1/store/{id}",
    tag = "Stores",
    params(("id" = i32, Path, description = "Store id")),
    responses(
        (status = 200, description = "Store found", body = ApiResponse<store::Model>),
        (status = 404, description = "Store not found", body = ErrorResponse),
    )
)]
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<store::Model> {
    let store = state.services.stores.get(id).await?;
    Ok(Json(ApiResponse::success(store)))
}

#[utoipa::path(
    get,
    path = "/api/v1/store",
    tag = "Stores",
    params(ListParams),
    responses(
        (status = 200, description = "Stores", body = ApiResponse<ListResponse<store::Model>>),
    )
)]
pub async fn list_stores(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<store::Model>> {
    let request = params.resolve(&state.config);
    let page = state.services.stores.list(&request).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/store/{id}",
    tag = "Stores",
    params(("id" = i32, Path, description = "Store id")),
    request_body = StoreInput,
    responses(
        (status = 200, description = "Store updated", body = ApiResponse<store::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Store not found", body = ErrorResponse),
    )
)]
pub async fn update_store(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<StoreInput>,
) -> ApiResult<store::Model> {
    let store = state.services.stores.update(id, input).await?;
    Ok(Json(ApiResponse::success(store)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/store/{id}",
    tag = "Stores",
    params(("id" = i32, Path, description = "Store id")),
    responses(
        (status = 204, description = "Store deleted"),
        (status = 404, description = "Store not found", body = ErrorResponse),
        (status = 409, description = "Store is still referenced", body = ErrorResponse),
    )
)]
pub async fn delete_store(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.stores.delete(id).await?;
    Ok(no_content_response())
}

pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route("/:id", get(get_store).put(update_store).delete(delete_store))
}
