use std::{net::SocketAddr, sync::Arc};

use http::HeaderValue;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use bikeshop_api as api;
use api::cache::{CacheBackend, InMemoryCache, RedisCache};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);
    api::handlers::health::init_start_time();

    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }

    let cache = build_cache(&cfg).await;
    let cors_layer = build_cors(&cfg)?;
    let addr = SocketAddr::new(cfg.host.parse()?, cfg.port);

    let state = api::AppState::new(Arc::new(db_pool), cfg, cache);
    let app = api::build_router(state).layer(cors_layer);

    info!("bikeshop-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Redis when configured and reachable, otherwise the in-process cache.
async fn build_cache(cfg: &api::config::AppConfig) -> Arc<dyn CacheBackend> {
    if !cfg.uses_redis_cache() {
        return Arc::new(InMemoryCache::new());
    }

    let connected = match redis::Client::open(cfg.redis_url.as_str()) {
        Ok(client) => RedisCache::connect(client).await,
        Err(e) => Err(e.into()),
    };
    match connected {
        Ok(cache) => {
            info!("Product list cache backed by Redis");
            Arc::new(cache)
        }
        Err(e) => {
            warn!(error = %e, "Redis unavailable; falling back to in-memory cache");
            Arc::new(InMemoryCache::new())
        }
    }
}

fn build_cors(cfg: &api::config::AppConfig) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any));
    }
    if cfg.should_allow_permissive_cors() {
        info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        return Ok(CorsLayer::permissive());
    }
    Err("Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true".into())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
