use crate::{config::AppConfig, services::ListRequest, ApiResponse};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// `201 Created` with the standard envelope.
pub fn created_response<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

pub fn no_content_response() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Query parameters shared by list endpoints
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Rows to skip (default: 0)
    pub offset: Option<u64>,
    /// Page size (default: 10, capped at the configured maximum)
    pub limit: Option<u64>,
    /// Case-insensitive substring filter on the entity's name fields
    pub search: Option<String>,
}

impl ListParams {
    pub fn resolve(self, config: &AppConfig) -> ListRequest {
        let limit = match self.limit {
            Some(0) | None => config.default_list_limit,
            Some(limit) => limit.min(config.max_list_limit),
        };
        ListRequest::new(self.offset.unwrap_or(0), limit, self.search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "redis://127.0.0.1:6379".into(),
            "127.0.0.1".into(),
            8080,
            "test".into(),
        )
    }

    #[test]
    fn list_params_apply_defaults_and_cap() {
        let cfg = config();
        let defaults = ListParams::default().resolve(&cfg);
        assert_eq!((defaults.offset, defaults.limit), (0, 10));

        let capped = ListParams {
            offset: Some(20),
            limit: Some(5_000),
            search: Some("trek".into()),
        }
        .resolve(&cfg);
        assert_eq!((capped.offset, capped.limit), (20, 100));
        assert_eq!(capped.search(), Some("trek"));
    }
}
