//! Orders and their items. Adding an item goes through fulfillment and
//! debits the store's stock; removing one does not restock.

use super::common::{created_response, no_content_response, ListParams};
use crate::{
    entities::{order, order_item},
    errors::{ErrorResponse, ServiceError},
    services::{
        fulfillment::AddItemInput,
        orders::{OrderDetails, OrderInput, OrderWithItems},
        ListResponse,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RemoveItemParams {
    /// Line to remove
    pub item_id: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/order",
    tag = "Orders",
    request_body = OrderInput,
    responses(
        (status = 201, description = "Order created with no items", body = ApiResponse<order::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 409, description = "A referenced record does not exist", body = ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<OrderInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.create(input).await?;
    Ok(created_response(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/order/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderDetails>),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<OrderDetails> {
    let order = state.services.orders.get(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/order",
    tag = "Orders",
    params(ListParams),
    responses(
        (status = 200, description = "Orders, searchable by customer name", body = ApiResponse<ListResponse<OrderWithItems>>),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<OrderWithItems>> {
    let request = params.resolve(&state.config);
    let page = state.services.orders.list(&request).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/order/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id")),
    request_body = OrderInput,
    responses(
        (status = 200, description = "Header updated", body = ApiResponse<OrderDetails>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<OrderInput>,
) -> ApiResult<OrderDetails> {
    let orders = &state.services.orders;
    if orders.update_header(id, input).await? == 0 {
        return Err(ServiceError::NotFound(format!("Order {} not found", id)));
    }
    Ok(Json(ApiResponse::success(orders.get(id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/order/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order and its items deleted"),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    if state.services.orders.delete(id).await? == 0 {
        return Err(ServiceError::NotFound(format!("Order {} not found", id)));
    }
    Ok(no_content_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/order_item",
    tag = "Orders",
    request_body = AddItemInput,
    responses(
        (status = 201, description = "Item added and stock debited", body = ApiResponse<order_item::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Order or stock entry not found", body = ErrorResponse),
        (status = 422, description = "Not enough stock at the order's store", body = ErrorResponse),
    )
)]
pub async fn add_order_item(
    State(state): State<AppState>,
    Json(input): Json<AddItemInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.fulfillment.add_item(input).await?;
    Ok(created_response(item))
}

#[utoipa::path(
    delete,
    path = "/api/v1/order_item/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id"), RemoveItemParams),
    responses(
        (status = 204, description = "Item removed; stock is not restored"),
        (status = 404, description = "No such item", body = ErrorResponse),
    )
)]
pub async fn remove_order_item(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Query(params): Query<RemoveItemParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let removed = state
        .services
        .orders
        .remove_item(order_id, params.item_id)
        .await?;
    if removed == 0 {
        return Err(ServiceError::NotFound(format!(
            "Order {} has no item {}",
            order_id, params.item_id
        )));
    }
    Ok(no_content_response())
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
}

pub fn order_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(add_order_item))
        .route("/:id", delete(remove_order_item))
}
