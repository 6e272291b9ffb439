// Background sampler: one host snapshot per tick into the metric store, retention prune every few minutes.
// Tick failures are logged and absorbed; the loop only exits on the shutdown signal.

use crate::metrics_repo::MetricStore;
use crate::models::Snapshot;
use crate::sysinfo_repo::HostStatsSource;
use chrono::{DateTime, Timelike, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::Instrument;

/// Running totals since start. Shared with the caller so tests and logs can read them.
#[derive(Debug, Default)]
pub struct SamplerStats {
    pub saved: AtomicU64,
    pub skipped: AtomicU64,
    pub write_failed: AtomicU64,
    pub pruned: AtomicU64,
}

/// Store, host source and shutdown for the sampler.
pub struct SamplerDeps {
    pub source: Arc<dyn HostStatsSource>,
    pub store: Arc<dyn MetricStore>,
    pub stats: Arc<SamplerStats>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Sampler timing and retention.
#[derive(Debug, Clone)]
pub struct SamplerParams {
    pub interval: Duration,
    pub retention: chrono::Duration,
    pub prune_every_minutes: u32,
    pub stats_log_interval: Duration,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TickReport {
    pub(crate) saved: bool,
    pub(crate) skipped: bool,
    /// Rows removed when the prune window was hit and the delete succeeded.
    pub(crate) pruned: Option<u64>,
}

/// Prune only on ticks landing on a wall-clock minute divisible by `every_minutes`.
pub(crate) fn should_prune(now: DateTime<Utc>, every_minutes: u32) -> bool {
    every_minutes > 0 && now.minute() % every_minutes == 0
}

struct Sampler {
    source: Arc<dyn HostStatsSource>,
    store: Arc<dyn MetricStore>,
    retention: chrono::Duration,
    prune_every_minutes: u32,
}

impl Sampler {
    /// Sample, append, maybe prune. Never fails; every error is logged here.
    async fn collect_once(&self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport {
            saved: false,
            skipped: false,
            pruned: None,
        };

        match self.source.sample().await {
            Ok(sample) => {
                let snapshot = Snapshot::from(sample);
                match self.store.append(&snapshot).await {
                    Ok(()) => {
                        report.saved = true;
                        tracing::debug!(operation = "append", cpu = snapshot.cpu_percent, "snapshot saved");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, operation = "append", "Error saving metric");
                    }
                }
            }
            Err(e) => {
                report.skipped = true;
                tracing::warn!(error = %e, operation = "sample", "Error collecting stats");
            }
        }

        if should_prune(now, self.prune_every_minutes) {
            let cutoff = now - self.retention;
            match self.store.delete_older_than(cutoff).await {
                Ok(n) => {
                    report.pruned = Some(n);
                    tracing::debug!(operation = "delete_older_than", removed = n, %cutoff, "old snapshots pruned");
                }
                Err(e) => {
                    tracing::warn!(error = %e, operation = "delete_older_than", "Failed to prune old data");
                }
            }
        }

        report
    }
}

pub fn spawn(deps: SamplerDeps, params: SamplerParams) -> tokio::task::JoinHandle<()> {
    let SamplerDeps {
        source,
        store,
        stats,
        mut shutdown_rx,
    } = deps;
    let SamplerParams {
        interval,
        retention,
        prune_every_minutes,
        stats_log_interval,
    } = params;

    let sampler = Sampler {
        source,
        store,
        retention,
        prune_every_minutes,
    };

    let sampler_span = tracing::span!(
        tracing::Level::DEBUG,
        "sampler",
        interval_secs = interval.as_secs()
    );

    let task = async move {
        // First sample one full period after start.
        let mut tick = interval_at(Instant::now() + interval, interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats_log_tick = interval_at(Instant::now() + stats_log_interval, stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval_secs = interval.as_secs(), "Sampler started");

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let report = sampler.collect_once(Utc::now()).await;
                    if report.saved {
                        stats.saved.fetch_add(1, Ordering::Relaxed);
                    } else if report.skipped {
                        stats.skipped.fetch_add(1, Ordering::Relaxed);
                    } else {
                        stats.write_failed.fetch_add(1, Ordering::Relaxed);
                    }
                    if let Some(n) = report.pruned {
                        stats.pruned.fetch_add(n, Ordering::Relaxed);
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Sampler shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        snapshots_saved_total = stats.saved.load(Ordering::Relaxed),
                        ticks_skipped_total = stats.skipped.load(Ordering::Relaxed),
                        writes_failed_total = stats.write_failed.load(Ordering::Relaxed),
                        snapshots_pruned_total = stats.pruned.load(Ordering::Relaxed),
                        "sampler stats"
                    );
                }
            }
        }
    };

    tokio::spawn(task.instrument(sampler_span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AcquisitionError, StorageError};
    use crate::metrics_repo::MemoryMetricsRepo;
    use crate::models::HostSample;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FixedSource;

    #[async_trait]
    impl HostStatsSource for FixedSource {
        async fn sample(&self) -> Result<HostSample, AcquisitionError> {
            Ok(HostSample {
                cpu_percent: 12.5,
                memory_used_bytes: 1024,
                disk_used_bytes: 2048,
                timestamp: Utc::now(),
            })
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl HostStatsSource for BrokenSource {
        async fn sample(&self) -> Result<HostSample, AcquisitionError> {
            Err(AcquisitionError::NoDisks)
        }
    }

    /// Reads work; writes and deletes fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl MetricStore for ReadOnlyStore {
        async fn append(&self, _: &Snapshot) -> Result<(), StorageError> {
            Err(StorageError::Write(sqlx::Error::PoolClosed))
        }
        async fn query_range(&self, _: DateTime<Utc>) -> Result<Vec<Snapshot>, StorageError> {
            Ok(vec![])
        }
        async fn delete_older_than(&self, _: DateTime<Utc>) -> Result<u64, StorageError> {
            Err(StorageError::Delete(sqlx::Error::PoolClosed))
        }
    }

    fn at_minute(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 30).unwrap()
    }

    fn sampler(source: Arc<dyn HostStatsSource>, store: Arc<dyn MetricStore>) -> Sampler {
        Sampler {
            source,
            store,
            retention: chrono::Duration::hours(25),
            prune_every_minutes: 10,
        }
    }

    #[test]
    fn should_prune_on_multiples_of_ten() {
        assert!(should_prune(at_minute(0), 10));
        assert!(should_prune(at_minute(10), 10));
        assert!(should_prune(at_minute(50), 10));
        assert!(!should_prune(at_minute(1), 10));
        assert!(!should_prune(at_minute(59), 10));
        assert!(should_prune(at_minute(7), 1));
        assert!(!should_prune(at_minute(7), 0));
    }

    #[tokio::test]
    async fn collect_once_appends_one_snapshot() {
        let store = Arc::new(MemoryMetricsRepo::new());
        let s = sampler(Arc::new(FixedSource), store.clone());

        let report = s.collect_once(at_minute(3)).await;
        assert!(report.saved);
        assert!(!report.skipped);
        assert_eq!(report.pruned, None);

        let all = store.query_range(at_minute(0) - chrono::Duration::days(365)).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].cpu_percent, 12.5);
        assert_eq!(all[0].memory_used_bytes, 1024);
        assert_eq!(all[0].disk_used_bytes, 2048);
    }

    #[tokio::test]
    async fn collect_once_skips_on_acquisition_failure() {
        let store = Arc::new(MemoryMetricsRepo::new());
        let s = sampler(Arc::new(BrokenSource), store.clone());

        let report = s.collect_once(at_minute(3)).await;
        assert!(!report.saved);
        assert!(report.skipped);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn collect_once_prunes_on_tenth_minute() {
        let store = Arc::new(MemoryMetricsRepo::new());
        let now = at_minute(20);
        for hours_ago in [30, 26, 24, 1] {
            store
                .append(&Snapshot {
                    timestamp: now - chrono::Duration::hours(hours_ago),
                    cpu_percent: hours_ago as f64,
                    memory_used_bytes: 0,
                    disk_used_bytes: 0,
                })
                .await
                .unwrap();
        }
        let s = sampler(Arc::new(BrokenSource), store.clone());

        let report = s.collect_once(now).await;
        assert_eq!(report.pruned, Some(2));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn collect_once_does_not_prune_off_window() {
        let store = Arc::new(MemoryMetricsRepo::new());
        let now = at_minute(21);
        store
            .append(&Snapshot {
                timestamp: now - chrono::Duration::hours(30),
                cpu_percent: 0.0,
                memory_used_bytes: 0,
                disk_used_bytes: 0,
            })
            .await
            .unwrap();
        let s = sampler(Arc::new(BrokenSource), store.clone());

        let report = s.collect_once(now).await;
        assert_eq!(report.pruned, None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn collect_once_absorbs_write_and_prune_failures() {
        let s = sampler(Arc::new(FixedSource), Arc::new(ReadOnlyStore));
        let report = s.collect_once(at_minute(40)).await;
        assert!(!report.saved);
        assert!(!report.skipped);
        assert_eq!(report.pruned, None);
    }
}
