// JSON handlers for the dashboard API

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::collections::HashMap;

use super::{ApiError, AppState};
use crate::models::{
    AppSettings, Container, ContainerAction, ContainerSettings, ContainerSettingsUpdate,
    HostStats, Snapshot,
};

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/health: splash screen and container healthcheck.
pub(super) async fn health_handler() -> StatusCode {
    StatusCode::OK
}

pub(super) async fn containers_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Container>>, ApiError> {
    let settings = state
        .settings_repo
        .all_container_settings()
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "container settings unavailable, listing without them");
            HashMap::new()
        });
    state
        .docker_repo
        .list_containers(&settings)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// GET /api/containers/{id}/stats: `{}` when Docker can't answer in time.
pub(super) async fn container_stats_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    match state.docker_repo.container_stats(&id).await {
        Ok(stats) => Json(serde_json::to_value(stats).unwrap_or_else(|_| serde_json::json!({}))),
        Err(e) => {
            tracing::debug!(error = %e, container = %id, "container stats unavailable");
            Json(serde_json::json!({}))
        }
    }
}

pub(super) async fn container_action_handler(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let action: ContainerAction = action
        .parse()
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Invalid action"))?;
    state
        .docker_repo
        .control(&id, action)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(StatusCode::OK)
}

pub(super) async fn host_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<HostStats>, ApiError> {
    state
        .sysinfo_repo
        .host_stats()
        .await
        .map(Json)
        .map_err(|e| ApiError::internal(e.to_string()))
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    period: Option<String>,
}

/// GET /api/stats/history?period=1h|24h: unknown periods are served as 1h.
pub(super) async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Snapshot>>, ApiError> {
    let period = query.period.as_deref().unwrap_or("1h");
    state
        .history
        .get_history(period)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal(e.to_string()))
}

pub(super) async fn save_container_settings_handler(
    State(state): State<AppState>,
    payload: Result<Json<ContainerSettingsUpdate>, JsonRejection>,
) -> Result<Json<ContainerSettings>, ApiError> {
    let Json(update) =
        payload.map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Invalid payload"))?;
    state
        .settings_repo
        .save_container_settings(&update)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::warn!(error = %e, container = %update.id, "save container settings failed");
            ApiError::internal("Failed to save settings")
        })
}

pub(super) async fn app_settings_handler(
    State(state): State<AppState>,
) -> Result<Json<AppSettings>, ApiError> {
    state.settings_repo.app_settings().await.map(Json).map_err(|e| {
        tracing::warn!(error = %e, "fetch app settings failed");
        ApiError::internal("Failed to fetch settings")
    })
}
