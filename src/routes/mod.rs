// HTTP routes: JSON API under /api, static frontend for everything else

mod http;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::config::AppConfig;
use crate::docker_repo::DockerRepo;
use crate::history_service::HistoryService;
use crate::settings_repo::SettingsRepo;
use crate::sysinfo_repo::SysinfoRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) docker_repo: Arc<DockerRepo>,
    pub(crate) sysinfo_repo: Arc<SysinfoRepo>,
    pub(crate) settings_repo: Arc<SettingsRepo>,
    pub(crate) history: Arc<HistoryService>,
}

/// Error body the frontend expects: `{"error": "..."}`.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

pub fn app(
    docker_repo: Arc<DockerRepo>,
    sysinfo_repo: Arc<SysinfoRepo>,
    settings_repo: Arc<SettingsRepo>,
    history: Arc<HistoryService>,
    config: &AppConfig,
) -> Router {
    let state = AppState {
        docker_repo,
        sysinfo_repo,
        settings_repo,
        history,
    };

    // Unknown paths get index.html so client-side routing works on reload.
    let dist = Path::new(&config.frontend.dist_dir);
    let frontend = ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html")));

    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/health", get(http::health_handler)) // GET /api/health
        .route("/api/containers", get(http::containers_handler)) // GET /api/containers
        .route(
            "/api/containers/{id}/stats",
            get(http::container_stats_handler),
        ) // GET /api/containers/{id}/stats
        .route(
            "/api/containers/{id}/{action}",
            post(http::container_action_handler),
        ) // POST /api/containers/{id}/{action}
        .route("/api/stats/host", get(http::host_stats_handler)) // GET /api/stats/host
        .route("/api/stats/history", get(http::history_handler)) // GET /api/stats/history?period=
        .route("/api/settings", get(http::app_settings_handler)) // GET /api/settings
        .route(
            "/api/settings/container",
            post(http::save_container_settings_handler),
        ) // POST /api/settings/container
        .fallback_service(frontend)
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
