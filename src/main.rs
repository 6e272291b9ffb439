use anyhow::Result;
use dockdash::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let pool = db::connect(&app_config.database.path, app_config.database.max_pool_size).await?;
    let metrics_repo = Arc::new(metrics_repo::SqliteMetricsRepo::new(pool.clone()));
    metrics_repo.init().await?;
    let settings_repo = Arc::new(settings_repo::SettingsRepo::new(pool.clone()));
    settings_repo.init().await?;

    let sysinfo_repo = Arc::new(sysinfo_repo::SysinfoRepo::new(
        Duration::from_secs(app_config.sampler.acquisition_timeout_secs),
        app_config.host.public_ip_url.clone(),
    )?);
    let docker_repo = Arc::new(docker_repo::DockerRepo::connect()?);
    docker_repo.check_connection().await;

    let history = Arc::new(history_service::HistoryService::new(
        metrics_repo.clone(),
        app_config.history.target_points,
    ));

    let (sampler_shutdown_tx, sampler_shutdown_rx) = tokio::sync::oneshot::channel();
    let sampler_handle = sampler::spawn(
        sampler::SamplerDeps {
            source: sysinfo_repo.clone(),
            store: metrics_repo.clone(),
            stats: Arc::new(sampler::SamplerStats::default()),
            shutdown_rx: sampler_shutdown_rx,
        },
        sampler::SamplerParams {
            interval: Duration::from_secs(app_config.sampler.interval_secs),
            retention: chrono::Duration::hours(i64::from(app_config.database.retention_hours)),
            prune_every_minutes: app_config.sampler.prune_every_minutes,
            stats_log_interval: Duration::from_secs(app_config.sampler.stats_log_interval_secs),
        },
    );

    let (maintenance_shutdown_tx, maintenance_shutdown_rx) = tokio::sync::oneshot::channel();
    let maintenance_handle = maintenance::spawn(
        pool,
        maintenance::MaintenanceConfig {
            vacuum_schedule: app_config.database.vacuum_schedule.clone(),
            vacuum_interval_secs: app_config.database.vacuum_interval_secs,
        },
        maintenance_shutdown_rx,
    );

    let app = routes::app(
        docker_repo,
        sysinfo_repo,
        settings_repo,
        history,
        &app_config,
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
        }
    }

    let _ = sampler_shutdown_tx.send(());
    let _ = maintenance_shutdown_tx.send(());
    let _ = sampler_handle.await;
    let _ = maintenance_handle.await;

    Ok(())
}
