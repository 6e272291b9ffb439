// HTTP tests: JSON API and static frontend fallback

mod common;

use axum_test::TestServer;
use chrono::Duration;
use common::minute_series;
use dockdash::config::AppConfig;
use dockdash::docker_repo::DockerRepo;
use dockdash::history_service::{DEFAULT_TARGET_POINTS, HistoryService};
use dockdash::metrics_repo::{MemoryMetricsRepo, MetricStore};
use dockdash::routes;
use dockdash::settings_repo::SettingsRepo;
use dockdash::sysinfo_repo::SysinfoRepo;
use std::sync::Arc;

const TEST_CONFIG: &str = r#"
[server]
port = 8080
host = "0.0.0.0"

[database]
path = "data/test.db"
max_pool_size = 2
"#;

struct Harness {
    server: TestServer,
    store: Arc<MemoryMetricsRepo>,
    _dir: tempfile::TempDir,
}

/// None when the Docker client can't be built on this machine.
async fn harness() -> Option<Harness> {
    let docker_repo = match DockerRepo::connect() {
        Ok(r) => Arc::new(r),
        Err(_) => return None,
    };

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>dashboard</html>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('ok')").unwrap();
    let config_str = format!(
        "{}\n[frontend]\ndist_dir = {:?}\n",
        TEST_CONFIG,
        dir.path().to_str().unwrap()
    );
    let config = AppConfig::load_from_str(&config_str).unwrap();

    let pool = dockdash::db::connect(dir.path().join("test.db").to_str().unwrap(), 2)
        .await
        .unwrap();
    let settings_repo = Arc::new(SettingsRepo::new(pool));
    settings_repo.init().await.unwrap();

    let store = Arc::new(MemoryMetricsRepo::new());
    let history = Arc::new(HistoryService::new(store.clone(), DEFAULT_TARGET_POINTS));
    let sysinfo_repo = Arc::new(
        SysinfoRepo::new(std::time::Duration::from_secs(10), None).unwrap(),
    );

    let app = routes::app(docker_repo, sysinfo_repo, settings_repo, history, &config);
    Some(Harness {
        server: TestServer::new(app),
        store,
        _dir: dir,
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let Some(h) = harness().await else { return };
    h.server.get("/api/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_version_endpoint() {
    let Some(h) = harness().await else { return };
    let response = h.server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("dockdash"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_history_empty_store_is_empty_array() {
    let Some(h) = harness().await else { return };
    let response = h.server.get("/api/stats/history").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_history_uses_chart_keys() {
    let Some(h) = harness().await else { return };
    for s in minute_series(5, Duration::zero()) {
        h.store.append(&s).await.unwrap();
    }
    let response = h.server.get("/api/stats/history").add_query_param("period", "24h").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    let points = json.as_array().unwrap();
    assert_eq!(points.len(), 5);
    let first = points[0].as_object().unwrap();
    for key in ["timestamp", "cpu", "memory", "disk"] {
        assert!(first.contains_key(key), "missing {}", key);
    }
    assert_eq!(first.len(), 4);
    assert!(first["timestamp"].is_string());
}

#[tokio::test]
async fn test_history_downsamples_long_windows() {
    let Some(h) = harness().await else { return };
    for s in minute_series(1500, Duration::zero()) {
        h.store.append(&s).await.unwrap();
    }
    let response = h.server.get("/api/stats/history?period=24h").await;
    response.assert_status_ok();
    let points: Vec<serde_json::Value> = response.json();
    assert!(points.len() <= DEFAULT_TARGET_POINTS + 1);
    assert!(points.len() >= DEFAULT_TARGET_POINTS - 1);
}

#[tokio::test]
async fn test_history_unknown_period_falls_back() {
    let Some(h) = harness().await else { return };
    for s in minute_series(180, Duration::minutes(1)) {
        h.store.append(&s).await.unwrap();
    }
    let bogus: Vec<serde_json::Value> = h.server.get("/api/stats/history?period=7d").await.json();
    let hour: Vec<serde_json::Value> = h.server.get("/api/stats/history?period=1h").await.json();
    assert_eq!(bogus, hour);
}

#[tokio::test]
async fn test_container_action_rejects_unknown_action() {
    let Some(h) = harness().await else { return };
    let response = h
        .server
        .post("/api/containers/abc/explode")
        .expect_failure()
        .await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "Invalid action");
}

#[tokio::test]
async fn test_app_settings_defaults() {
    let Some(h) = harness().await else { return };
    let response = h.server.get("/api/settings").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["theme"], "dark");
    assert_eq!(json["language"], "en");
    assert!(json.get("UpdatedAt").is_some());
}

#[tokio::test]
async fn test_save_container_settings_round_trip() {
    let Some(h) = harness().await else { return };
    let response = h
        .server
        .post("/api/settings/container")
        .json(&serde_json::json!({
            "id": "abc123",
            "alias": "Web",
            "icon": "globe",
            "group_name": "frontend"
        }))
        .await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["id"], "abc123");
    assert_eq!(json["alias"], "Web");
    assert_eq!(json["hidden"], false);
    assert!(json.get("CreatedAt").is_some());
}

#[tokio::test]
async fn test_save_container_settings_rejects_bad_payload() {
    let Some(h) = harness().await else { return };
    let response = h
        .server
        .post("/api/settings/container")
        .content_type("application/json")
        .bytes("{not json".into())
        .expect_failure()
        .await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "Invalid payload");
}

#[tokio::test]
async fn test_host_stats_shape() {
    let Some(h) = harness().await else { return };
    let response = h.server.get("/api/stats/host").await;
    // Hosts without a mounted disk report an error body instead.
    if response.status_code() != 200 {
        return;
    }
    let json: serde_json::Value = response.json();
    for key in ["cpu_percent", "memory_total", "memory_used", "disk_total", "disk_used", "timestamp"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
}

#[tokio::test]
async fn test_frontend_assets_and_spa_fallback() {
    let Some(h) = harness().await else { return };
    let asset = h.server.get("/app.js").await;
    asset.assert_status_ok();
    asset.assert_text("console.log('ok')");

    let deep_link = h.server.get("/containers/some-id").await;
    deep_link.assert_status_ok();
    deep_link.assert_text("<html>dashboard</html>");
}
