use super::common::created_response;
use crate::{
    errors::{ErrorResponse, ServiceError},
    services::auth::{LoginInput, RegisterInput, RegisteredUser, TokenResponse},
    ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};

#[utoipa::path(
    post,
    path = "/api/v1/register",
    tag = "Users",
    request_body = RegisterInput,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<RegisteredUser>),
        (status = 400, description = "Username or password out of bounds", body = ErrorResponse),
        (status = 409, description = "Username taken, ignoring case", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.auth.register(input).await?;
    Ok(created_response(user))
}

#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "Users",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Bearer token issued", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> ApiResult<TokenResponse> {
    let token = state.services.auth.login(input).await?;
    Ok(Json(ApiResponse::success(token)))
}

/// `POST /register`, `POST /login`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
