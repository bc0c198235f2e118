use super::common::{created_response, no_content_response, ListParams};
use crate::{
    entities::staff,
    errors::{ErrorResponse, ServiceError},
    services::{staffs::{StaffDetails, StaffInput}, ListResponse},
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
    path = "/api/v1/staff",
    tag = "Staff",
    request_body = StaffInput,
    responses(
        (status = 201, description = "Staff created", body = ApiResponse<staff::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn create_staff(
    State(state): State<AppState>,
    Json(input): Json<StaffInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let staff = state.services.staffs.create(input).await?;
    Ok(created_response(staff))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/{id}",
    tag = "Staff",
    params(("id" = i32, Path, description = "Staff id")),
    responses(
        (status = 200, description = "Staff found", body = ApiResponse<StaffDetails>),
        (status = 404, description = "Staff not found", body = ErrorResponse),
    )
)]
pub async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StaffDetails> {
    let staff = state.services.staffs.get(id).await?;
    Ok(Json(ApiResponse::success(staff)))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff",
    tag = "Staff",
    params(ListParams),
    responses(
        (status = 200, description = "Staff", body = ApiResponse<ListResponse<staff::Model>>),
    )
)]
pub async fn list_staff(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<staff::Model>> {
    let request = params.resolve(&state.config);
    let page = state.services.staffs.list(&request).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/staff/{id}",
    tag = "Staff",
    params(("id" = i32, Path, description = "Staff id")),
    request_body = StaffInput,
    responses(
        (status = 200, description = "Staff updated", body = ApiResponse<staff::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Staff not found", body = ErrorResponse),
    )
)]
pub async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<StaffInput>,
) -> ApiResult<staff::Model> {
    let staff = state.services.staffs.update(id, input).await?;
    Ok(Json(ApiResponse::success(staff)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/staff/{id}",
    tag = "Staff",
    params(("id" = i32, Path, description = "Staff id")),
    responses(
        (status = 204, description = "Staff deleted"),
        (status = 404, description = "Staff not found", body = ErrorResponse),
        (status = 409, description = "Staff member still manages staff or owns orders", body = ErrorResponse),
    )
)]
pub async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.staffs.delete(id).await?;
    Ok(no_content_response())
}

pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route("/:id", get(get_staff).put(update_staff).delete(delete_staff))
}
