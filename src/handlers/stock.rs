use super::common::{created_response, ListParams};
use crate::{
    entities::stock,
    errors::{ErrorResponse, ServiceError},
    services::{
        stock::{StockInput, StoreStock},
        ListResponse,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteStockParams {
    /// Restrict the delete to one product
    pub product_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedRows {
    pub deleted: u64,
}

#[utoipa::path(
    post,
    path = "/api/v1/stock",
    tag = "Stock",
    request_body = StockInput,
    responses(
        (status = 201, description = "Stock entry created", body = ApiResponse<stock::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 409, description = "Entry exists or references a missing store or product", body = ErrorResponse),
    )
)]
pub async fn create_stock(
    State(state): State<AppState>,
    Json(input): Json<StockInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let entry = state.services.stock.create(input).await?;
    Ok(created_response(entry))
}

#[utoipa::path(
    get,
    path = "/api/v1/stock/{store_id}",
    tag = "Stock",
    params(("store_id" = i32, Path, description = "Store id")),
    responses(
        (status = 200, description = "Stock held by the store", body = ApiResponse<StoreStock>),
        (status = 404, description = "Store holds no stock", body = ErrorResponse),
    )
)]
pub async fn get_store_stock(
    State(state): State<AppState>,
    Path(store_id): Path<i32>,
) -> ApiResult<StoreStock> {
    let stock = state.services.stock.get_store(store_id).await?;
    Ok(Json(ApiResponse::success(stock)))
}

#[utoipa::path(
    get,
    path = "/api/v1/stock",
    tag = "Stock",
    params(ListParams),
    responses(
        (status = 200, description = "Stock rows", body = ApiResponse<ListResponse<stock::Model>>),
    )
)]
pub async fn list_stock(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<stock::Model>> {
    let request = params.resolve(&state.config);
    let page = state.services.stock.list(&request).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/stock",
    tag = "Stock",
    request_body = StockInput,
    responses(
        (status = 200, description = "Quantity set", body = ApiResponse<stock::Model>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "No entry for this store and product", body = ErrorResponse),
    )
)]
pub async fn update_stock(
    State(state): State<AppState>,
    Json(input): Json<StockInput>,
) -> ApiResult<stock::Model> {
    let entry = state.services.stock.update(input).await?;
    Ok(Json(ApiResponse::success(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/stock/{store_id}",
    tag = "Stock",
    params(("store_id" = i32, Path, description = "Store id"), DeleteStockParams),
    responses(
        (status = 200, description = "Rows removed", body = ApiResponse<DeletedRows>),
        (status = 404, description = "Nothing matched", body = ErrorResponse),
    )
)]
pub async fn delete_stock(
    State(state): State<AppState>,
    Path(store_id): Path<i32>,
    Query(params): Query<DeleteStockParams>,
) -> ApiResult<DeletedRows> {
    let deleted = state
        .services
        .stock
        .delete(store_id, params.product_id)
        .await?;
    Ok(Json(ApiResponse::success(DeletedRows { deleted })))
}

pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock).post(create_stock).put(update_stock))
        .route("/:store_id", get(get_store_stock).delete(delete_stock))
}
