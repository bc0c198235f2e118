use super::common::{created_response, no_content_response, ListParams};
use crate::{
    entities::promocode,
    errors::{ErrorResponse, ServiceError},
    services::{promocodes::PromocodeInput, ListResponse},
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
    path = "/api/v1/promocode",
    tag = "Promocodes",
    request_body = PromocodeInput,
    responses(
        (status = 201, description = "Promocode created", body = ApiResponse<promocode::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 409, description = "Name already taken, ignoring case", body = ErrorResponse),
    )
)]
pub async fn create_promocode(
    State(state): State<AppState>,
    Json(input): Json<PromocodeInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let code = state.services.promocodes.create(input).await?;
    Ok(created_response(code))
}

#[utoipa::path(
    get,
    path = "/api/v1/promocode/{id}",
    tag = "Promocodes",
    params(("id" = i32, Path, description = "Promocode id")),
    responses(
        (status = 200, description = "Promocode found", body = ApiResponse<promocode::Model>),
        (status = 404, description = "Promocode not found", body = ErrorResponse),
    )
)]
pub async fn get_promocode(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<promocode::Model> {
    let code = state.services.promocodes.get(id).await?;
    Ok(Json(ApiResponse::success(code)))
}

#[utoipa::path(
    get,
    path = "/api/v1/promocode",
    tag = "Promocodes",
    params(ListParams),
    responses(
        (status = 200, description = "Promocodes", body = ApiResponse<ListResponse<promocode::Model>>),
    )
)]
pub async fn list_promocodes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<promocode::Model>> {
    let request = params.resolve(&state.config);
    let page = state.services.promocodes.list(&request).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/promocode/{id}",
    tag = "Promocodes",
    params(("id" = i32, Path, description = "Promocode id")),
    responses(
        (status = 204, description = "Promocode deleted"),
        (status = 404, description = "Promocode not found", body = ErrorResponse),
    )
)]
pub async fn delete_promocode(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.promocodes.delete(id).await?;
    Ok(no_content_response())
}

/// Promocodes have no update route.
pub fn promocode_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_promocodes).post(create_promocode))
        .route("/:id", get(get_promocode).delete(delete_promocode))
}
