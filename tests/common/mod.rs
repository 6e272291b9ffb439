// Shared test helpers

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dockdash::error::AcquisitionError;
use dockdash::models::{HostSample, Snapshot};
use dockdash::sysinfo_repo::HostStatsSource;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn snapshot_at(timestamp: DateTime<Utc>, cpu: f64) -> Snapshot {
    Snapshot {
        timestamp,
        cpu_percent: cpu,
        memory_used_bytes: 512 * 1024 * 1024,
        disk_used_bytes: 20 * 1024 * 1024 * 1024,
    }
}

/// Now, truncated to the millisecond precision SQLite stores.
pub fn now_ms() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap()
}

/// `count` snapshots one minute apart, the newest `newest_age` before now.
pub fn minute_series(count: usize, newest_age: Duration) -> Vec<Snapshot> {
    let newest = now_ms() - newest_age;
    (0..count)
        .map(|i| {
            let age = Duration::minutes((count - 1 - i) as i64);
            snapshot_at(newest - age, i as f64 % 100.0)
        })
        .collect()
}

/// Host source that fails on the listed call numbers (1-based) and succeeds otherwise.
pub struct FlakySource {
    calls: AtomicUsize,
    fail_on: Vec<usize>,
}

impl FlakySource {
    pub fn failing_on(fail_on: &[usize]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: fail_on.to_vec(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostStatsSource for FlakySource {
    async fn sample(&self) -> Result<HostSample, AcquisitionError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on.contains(&n) {
            return Err(AcquisitionError::NoDisks);
        }
        Ok(HostSample {
            cpu_percent: n as f64,
            memory_used_bytes: 1024 * n as u64,
            disk_used_bytes: 4096,
            timestamp: Utc::now(),
        })
    }
}
