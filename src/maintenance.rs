// SQLite maintenance: VACUUM after retention prunes have freed pages.
// Runs on a cron schedule (local time) or a fixed interval when no schedule is set.

use chrono::{DateTime, Local};
use sqlx::sqlite::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Config for the maintenance task.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// Optional cron expression for VACUUM (e.g. "0 0 3 * * *" = 03:00 daily). Uses local time.
    pub vacuum_schedule: Option<String>,
    /// Run VACUUM every N seconds when vacuum_schedule is not set.
    pub vacuum_interval_secs: u64,
}

/// When VACUUM runs next.
#[derive(Debug, Clone)]
pub(crate) enum VacuumPlan {
    Cron(Box<cron::Schedule>),
    Every(Duration),
    Disabled,
}

impl VacuumPlan {
    pub(crate) fn from_config(config: &MaintenanceConfig) -> Self {
        match &config.vacuum_schedule {
            Some(expr) => match cron::Schedule::from_str(expr) {
                Ok(schedule) => VacuumPlan::Cron(Box::new(schedule)),
                Err(e) => {
                    warn!(cron = %expr, error = %e, "invalid vacuum_schedule; VACUUM will not run");
                    VacuumPlan::Disabled
                }
            },
            None => VacuumPlan::Every(Duration::from_secs(config.vacuum_interval_secs)),
        }
    }

    /// Delay from `now` until the next run. None = never.
    pub(crate) fn next_delay(&self, now: DateTime<Local>) -> Option<Duration> {
        match self {
            VacuumPlan::Cron(schedule) => schedule
                .after(&now)
                .next()
                .map(|next| (next - now).to_std().unwrap_or(Duration::from_secs(1))),
            VacuumPlan::Every(every) => Some(*every),
            VacuumPlan::Disabled => None,
        }
    }
}

/// Spawns the maintenance task. It exits when `shutdown_rx` fires or its sender is dropped.
pub fn spawn(
    pool: SqlitePool,
    config: MaintenanceConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let plan = VacuumPlan::from_config(&config);
        loop {
            let Some(delay) = plan.next_delay(Local::now()) else {
                // Nothing scheduled; just wait for shutdown.
                let _ = (&mut shutdown_rx).await;
                break;
            };
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    match crate::db::vacuum(&pool).await {
                        Ok(()) => info!("vacuum complete"),
                        Err(e) => warn!(error = %e, "vacuum failed"),
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Maintenance shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config(schedule: Option<&str>) -> MaintenanceConfig {
        MaintenanceConfig {
            vacuum_schedule: schedule.map(String::from),
            vacuum_interval_secs: 600,
        }
    }

    #[test]
    fn fixed_interval_when_no_schedule() {
        let plan = VacuumPlan::from_config(&config(None));
        assert_eq!(
            plan.next_delay(Local::now()),
            Some(Duration::from_secs(600))
        );
    }

    #[test]
    fn invalid_cron_disables_vacuum() {
        let plan = VacuumPlan::from_config(&config(Some("not a cron")));
        assert!(matches!(plan, VacuumPlan::Disabled));
        assert_eq!(plan.next_delay(Local::now()), None);
    }

    #[test]
    fn cron_schedule_waits_until_next_match() {
        // sec min hour day-of-month month day-of-week
        let plan = VacuumPlan::from_config(&config(Some("0 0 3 * * *")));
        let now = Local.with_ymd_and_hms(2026, 3, 10, 2, 0, 0).unwrap();
        assert_eq!(plan.next_delay(now), Some(Duration::from_secs(3600)));
    }
}
