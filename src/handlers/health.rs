use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub message: String,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub version: String,
    pub timestamp: String,
    pub uptime_secs: u64,
    pub database: ComponentHealth,
    pub cache: ComponentHealth,
}

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Records the process start; call once at startup.
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

fn component<E: std::fmt::Display>(result: Result<(), E>, started: Instant) -> ComponentHealth {
    let latency_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(()) => ComponentHealth {
            status: ComponentStatus::Up,
            message: "ok".to_string(),
            latency_ms,
        },
        Err(e) => ComponentHealth {
            status: ComponentStatus::Down,
            message: e.to_string(),
            latency_ms,
        },
    }
}

async fn liveness_check() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Ready when the database answers.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let database = component(crate::db::check_connection(&state.db).await, started);
    let status = if database.status == ComponentStatus::Up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(json!({ "database": database })))
}

/// Database and cache status. A failing cache degrades the service; a
/// failing database takes it down.
async fn detailed_health_check(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let database = component(crate::db::check_connection(&state.db).await, started);

    let started = Instant::now();
    let mut cache = component(state.cache.ping().await, started);
    cache.message = format!("{} ({})", cache.message, state.cache.name());

    let status = match (database.status, cache.status) {
        (ComponentStatus::Up, ComponentStatus::Up) => ComponentStatus::Up,
        (ComponentStatus::Up, _) => ComponentStatus::Degraded,
        _ => ComponentStatus::Down,
    };
    let code = if status == ComponentStatus::Down {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_secs: uptime_secs(),
            database,
            cache,
        }),
    )
}

/// `GET /health`, `GET /health/ready`, `GET /health/detailed`
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness_check))
        .route("/ready", get(readiness_check))
        .route("/detailed", get(detailed_health_check))
}
