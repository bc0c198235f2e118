use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_CACHE_BACKEND: &str = "in-memory";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_LIST_LIMIT: u64 = 10;
const DEFAULT_MAX_LIST_LIMIT: u64 = 100;
const DEFAULT_JWT_EXPIRATION_SECS: u64 = 3600;
/// Signing secret bundled for local development only.
const DEV_DEFAULT_JWT_SECRET: &str =
    "dev-only-bikeshop-signing-key:7fQ2mX9vLr4tKp8WzN3cHs6Yb1JdGe5A0uVoTiRqPyMkBlCnEgFhDjSwZxIaUO";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL (postgres:// or sqlite://)
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Server host address
    pub host: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    #[validate(length(min = 1))]
    pub environment: String,

    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1))]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,

    /// Cache backend for the product listing: "redis" or "in-memory"
    #[serde(default = "default_cache_backend")]
    #[validate(custom = "validate_cache_backend")]
    pub cache_backend: String,

    /// Redis connection URL, used when `cache_backend = "redis"`
    pub redis_url: String,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Page size applied when a list request carries no `limit`
    #[serde(default = "default_list_limit")]
    #[validate(range(min = 1))]
    pub default_list_limit: u64,

    /// Upper bound for `limit` on list requests
    #[serde(default = "default_max_list_limit")]
    #[validate(range(min = 1))]
    pub max_list_limit: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// HS256 key used to sign login tokens
    #[serde(default = "default_jwt_secret")]
    #[validate(custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// Lifetime of a login token in seconds
    #[serde(default = "default_jwt_expiration_secs")]
    #[validate(range(min = 60, max = 604800))]
    pub jwt_expiration_secs: u64,

    /// Comma separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow any origin outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,
}

impl AppConfig {
    /// Builds a configuration with defaults for everything but the essentials.
    pub fn new(
        database_url: String,
        redis_url: String,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            cache_backend: default_cache_backend(),
            redis_url,
            cache_ttl_secs: default_cache_ttl_secs(),
            default_list_limit: default_list_limit(),
            max_list_limit: default_max_list_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            jwt_secret: default_jwt_secret(),
            jwt_expiration_secs: default_jwt_expiration_secs(),
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_origins().next().is_some()
    }

    pub fn cors_origins(&self) -> impl Iterator<Item = &str> {
        self.cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    pub fn uses_redis_cache(&self) -> bool {
        self.cache_backend.eq_ignore_ascii_case("redis")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS for non-development environments or explicitly opt-in via APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if !self.is_development() && self.jwt_secret.trim() == DEV_DEFAULT_JWT_SECRET {
            let mut err = ValidationError::new("jwt_secret_default_dev");
            err.message = Some(
                "The bundled development JWT secret must not be used outside development. Set APP__JWT_SECRET."
                    .into(),
            );
            errors.add("jwt_secret", err);
        }

        if self.default_list_limit > self.max_list_limit {
            let mut err = ValidationError::new("default_list_limit");
            err.message = Some("default_list_limit must not exceed max_list_limit".into());
            errors.add("default_list_limit", err);
        }

        if self.db_min_connections > self.db_max_connections {
            let mut err = ValidationError::new("db_min_connections");
            err.message = Some("db_min_connections must not exceed db_max_connections".into());
            errors.add("db_min_connections", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_cache_backend() -> String {
    DEFAULT_CACHE_BACKEND.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    10
}
fn default_db_acquire_timeout_secs() -> u64 {
    10
}
fn default_db_idle_timeout_secs() -> u64 {
    300
}

fn default_list_limit() -> u64 {
    DEFAULT_LIST_LIMIT
}

fn default_max_list_limit() -> u64 {
    DEFAULT_MAX_LIST_LIMIT
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_jwt_secret() -> String {
    DEV_DEFAULT_JWT_SECRET.to_string()
}

fn default_jwt_expiration_secs() -> u64 {
    DEFAULT_JWT_EXPIRATION_SECS
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    let trimmed = secret.trim();
    if trimmed.len() < 32 {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must be at least 32 characters".into());
        return Err(err);
    }

    let unique_chars: std::collections::HashSet<char> = trimmed.chars().collect();
    if unique_chars.len() < 10 {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must have at least 10 unique characters".into());
        return Err(err);
    }
    Ok(())
}

fn validate_cache_backend(value: &str) -> Result<(), ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "in-memory" | "redis" => Ok(()),
        _ => {
            let mut err = ValidationError::new("cache_backend");
            err.message = Some("Must be one of: in-memory, redis".into());
            Err(err)
        }
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("bikeshop_api={},tower_http=debug", level);
    let filter = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(default_directive));

    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{RUN_ENV}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    load_config_from(Path::new(CONFIG_DIR), &run_env, true)
}

/// Loads configuration from `config_dir`, optionally layering `APP__*` variables on top.
pub fn load_config_from(
    config_dir: &Path,
    run_env: &str,
    with_env_vars: bool,
) -> Result<AppConfig, AppConfigError> {
    let mut builder = Config::builder()
        .set_default("database_url", "sqlite://bikeshop.db?mode=rwc")?
        .set_default("redis_url", "redis://localhost:6379")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(
            File::with_name(&config_dir.join("default").to_string_lossy()).required(false),
        )
        .add_source(File::with_name(&config_dir.join(run_env).to_string_lossy()).required(false));

    if with_env_vars {
        builder = builder.add_source(Environment::with_prefix("APP").separator("__"));
    }

    let app_config: AppConfig = builder.build()?.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration constraint validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::TempDir;

    fn config_dir_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    const PROD_SECRET: &str = "prod-signing-key-Zq81Lw0Vx7Ny2Tb5Hc9Kd3Jm6Gf4Rs";

    fn base_config() -> AppConfig {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "redis://127.0.0.1:6379".into(),
            "127.0.0.1".into(),
            8080,
            "production".into(),
        );
        cfg.jwt_secret = PROD_SECRET.into();
        cfg
    }

    #[test]
    fn defaults_apply_without_files() {
        let dir = config_dir_with(&[]);
        let cfg = load_config_from(dir.path(), "development", false).unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.default_list_limit, 10);
        assert_eq!(cfg.max_list_limit, 100);
        assert_eq!(cfg.cache_backend, "in-memory");
        assert_eq!(cfg.jwt_expiration_secs, 3600);
        assert!(cfg.is_development());
    }

    #[test]
    fn environment_file_overrides_default_file() {
        let dir = config_dir_with(&[
            (
                "default.toml",
                "database_url = \"postgres://localhost/default\"\nport = 9000\n",
            ),
            (
                "staging.toml",
                "database_url = \"postgres://staging/db\"\ncors_allow_any_origin = true\njwt_secret = \"prod-signing-key-Zq81Lw0Vx7Ny2Tb5Hc9Kd3Jm6Gf4Rs\"\n",
            ),
        ]);

        let cfg = load_config_from(dir.path(), "staging", false).unwrap();

        assert_eq!(cfg.database_url, "postgres://staging/db");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.environment, "staging");
    }

    #[test]
    fn invalid_values_fail_validation() {
        let dir = config_dir_with(&[(
            "default.toml",
            "log_level = \"loud\"\ncache_backend = \"memcached\"\n",
        )]);

        let result = load_config_from(dir.path(), "development", false);
        assert_matches!(result, Err(AppConfigError::Validation(errors)) => {
            assert!(errors.field_errors().contains_key("log_level"));
            assert!(errors.field_errors().contains_key("cache_backend"));
        });
    }

    #[test]
    fn non_dev_requires_cors_origins() {
        let cfg = base_config();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn non_dev_with_origins_passes() {
        let mut cfg = base_config();
        cfg.cors_allowed_origins = Some("https://shop.example.com, https://admin.example.com".into());
        assert!(cfg.validate_additional_constraints().is_ok());
        assert_eq!(cfg.cors_origins().count(), 2);
    }

    #[test]
    fn default_limit_cannot_exceed_max() {
        let mut cfg = base_config();
        cfg.cors_allow_any_origin = true;
        cfg.default_list_limit = 500;
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn dev_jwt_secret_is_rejected_outside_development() {
        let mut cfg = base_config();
        cfg.cors_allow_any_origin = true;
        cfg.jwt_secret = DEV_DEFAULT_JWT_SECRET.into();
        assert_matches!(cfg.validate_additional_constraints(), Err(errors) => {
            assert!(errors.field_errors().contains_key("jwt_secret"));
        });
    }

    #[test]
    fn short_jwt_secret_fails_validation() {
        let mut cfg = base_config();
        cfg.jwt_secret = "too-short".into();
        assert_matches!(cfg.validate(), Err(errors) => {
            assert!(errors.field_errors().contains_key("jwt_secret"));
        });
    }
}
