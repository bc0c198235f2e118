use super::common::{created_response, no_content_response, ListParams};
use crate::{
    entities::customer,
    errors::{ErrorResponse, ServiceError},
    services::{customers::CustomerInput, ListResponse},
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
    path = "/api/v1/customer",
    tag = "Customers",
    request_body = CustomerInput,
    responses(
        (status = 201, description = "Customer created", body = ApiResponse<customer::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.create(input).await?;
    Ok(created_response(customer))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer found", body = ApiResponse<customer::Model>),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<customer::Model> {
    let customer = state.services.customers.get(id).await?;
    Ok(Json(ApiResponse::success(customer)))
}

#[utoipa::path(
    get,
    path = "/api/v1/customer",
    tag = "Customers",
    params(ListParams),
    responses(
        (status = 200, description = "Customers", body = ApiResponse<ListResponse<customer::Model>>),
    )
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<customer::Model>> {
    let request = params.resolve(&state.config);
    let page = state.services.customers.list(&request).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/customer/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = CustomerInput,
    responses(
        (status = 200, description = "Customer updated", body = ApiResponse<customer::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    )
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<CustomerInput>,
) -> ApiResult<customer::Model> {
    let customer = state.services.customers.update(id, input).await?;
    Ok(Json(ApiResponse::success(customer)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/customer/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 409, description = "Customer still has orders", body = ErrorResponse),
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.delete(id).await?;
    Ok(no_content_response())
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer).put(update_customer).delete(delete_customer))
}
