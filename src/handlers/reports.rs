use super::common::ListParams;
use crate::{
    errors::ErrorResponse,
    services::{
        fulfillment::SendProduct,
        pricing::OrderTotal,
        reports::StaffReportResponse,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalSumParams {
    pub order_id: i32,
    /// Matched ignoring case
    pub promocode_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferResult {
    pub sender_id: i32,
    pub receiver_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

#[utoipa::path(
    get,
    path = "/api/v1/report/staff",
    tag = "Reports",
    params(ListParams),
    responses(
        (status = 200, description = "Sold lines per staff member", body = ApiResponse<StaffReportResponse>),
    )
)]
pub async fn staff_report(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<StaffReportResponse> {
    let request = params.resolve(&state.config);
    let report = state.services.reports.staff_report(&request).await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    put,
    path = "/api/v1/report/send_product",
    tag = "Reports",
    request_body = SendProduct,
    responses(
        (status = 200, description = "Stock moved", body = ApiResponse<TransferResult>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Sender or receiver has no entry for the product", body = ErrorResponse),
        (status = 422, description = "Sender doesn't have enough of this product", body = ErrorResponse),
        (status = 500, description = "Transfer left the ledger inconsistent", body = ErrorResponse),
    )
)]
pub async fn send_product(
    State(state): State<AppState>,
    Json(request): Json<SendProduct>,
) -> ApiResult<TransferResult> {
    let result = TransferResult {
        sender_id: request.sender_id,
        receiver_id: request.receiver_id,
        product_id: request.product_id,
        quantity: request.quantity,
    };
    state
        .services
        .fulfillment
        .send_product_to_store(request)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/report/total_sum",
    tag = "Reports",
    params(TotalSumParams),
    responses(
        (status = 200, description = "Order total, two decimals", body = ApiResponse<OrderTotal>),
        (status = 404, description = "Order has no items or promocode unknown", body = ErrorResponse),
    )
)]
pub async fn total_sum(
    State(state): State<AppState>,
    Query(params): Query<TotalSumParams>,
) -> ApiResult<OrderTotal> {
    let total = state
        .services
        .pricing
        .compute_total(params.order_id, params.promocode_name.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(total)))
}

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/staff", get(staff_report))
        .route("/send_product", put(send_product))
        .route("/total_sum", get(total_sum))
}
