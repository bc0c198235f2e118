//! Bike shop API
//!
//! Catalog, stock and order fulfillment for a chain of bicycle stores.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod cache;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};
use utoipa::ToSchema;

use crate::{
    cache::{CacheBackend, ProductListCache},
    config::AppConfig,
    db::DbPool,
    handlers::AppServices,
    services::auth::TokenIssuer,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub services: AppServices,
    pub cache: Arc<dyn CacheBackend>,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig, cache: Arc<dyn CacheBackend>) -> Self {
        let product_cache = ProductListCache::new(cache.clone(), config.cache_ttl());
        let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_expiration());
        Self {
            services: AppServices::new(db.clone(), product_cache, tokens),
            db,
            config: Arc::new(config),
            cache,
        }
    }
}

/// Envelope for every successful response.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Resource routers, mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth::auth_routes())
        .nest("/brand", handlers::brands::brand_routes())
        .nest("/category", handlers::categories::category_routes())
        .nest("/product", handlers::products::product_routes())
        .nest("/customer", handlers::customers::customer_routes())
        .nest("/store", handlers::stores::store_routes())
        .nest("/staff", handlers::staffs::staff_routes())
        .nest("/stock", handlers::stock::stock_routes())
        .nest("/order", handlers::orders::order_routes())
        .nest("/order_item", handlers::orders::order_item_routes())
        .nest("/promocode", handlers::promocodes::promocode_routes())
        .nest("/report", handlers::reports::report_routes())
}

/// The full application: API, health checks, Swagger UI and the request
/// layers shared by every route. CORS is left to the caller since it
/// depends on deployment settings.
pub fn build_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();
    Router::new()
        .route("/", get(|| async { "bikeshop-api up" }))
        .nest("/health", handlers::health::health_routes())
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
