// Host stats via sysinfo

mod ip;

use crate::error::AcquisitionError;
use crate::models::{HostSample, HostStats};
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sysinfo::{Disks, System};
use tracing::instrument;

/// Source of one host reading per sampler tick. Must return or fail in bounded time.
#[async_trait]
pub trait HostStatsSource: Send + Sync {
    async fn sample(&self) -> Result<HostSample, AcquisitionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DiskUsage {
    pub(crate) total: u64,
    pub(crate) used: u64,
}

/// Disk mounted at `/`, else the largest one. Input: (mount point, total, available).
pub(crate) fn pick_root_disk<'a>(
    disks: impl IntoIterator<Item = (&'a Path, u64, u64)>,
) -> Option<DiskUsage> {
    let mut largest: Option<DiskUsage> = None;
    for (mount, total, available) in disks {
        let usage = DiskUsage {
            total,
            used: total.saturating_sub(available),
        };
        if mount == Path::new("/") {
            return Some(usage);
        }
        if largest.is_none_or(|l| total > l.total) {
            largest = Some(usage);
        }
    }
    largest
}

/// `PRETTY_NAME` from an os-release file body, unquoted.
pub(crate) fn parse_pretty_name(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|v| v.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|v| !v.is_empty())
}

/// "Debian GNU/Linux 12 (bookworm)" style name; "<name> <version>" where os-release is missing.
fn os_pretty_name() -> String {
    if let Some(name) = std::fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|body| parse_pretty_name(&body))
    {
        return name;
    }
    format!(
        "{} {}",
        System::name().unwrap_or_else(|| std::env::consts::OS.into()),
        System::os_version().unwrap_or_default()
    )
    .trim()
    .to_string()
}

struct Reading {
    cpu_percent: f64,
    cpu_cores: u32,
    memory_used: u64,
    memory_total: u64,
    disk: DiskUsage,
}

pub struct SysinfoRepo {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    acquisition_timeout: Duration,
    public_ip_url: Option<String>,
    http: reqwest::Client,
}

impl SysinfoRepo {
    pub fn new(acquisition_timeout: Duration, public_ip_url: Option<String>) -> anyhow::Result<Self> {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let http = reqwest::Client::builder()
            .timeout(ip::PUBLIC_IP_TIMEOUT)
            .build()?;
        Ok(Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
            acquisition_timeout,
            public_ip_url: public_ip_url.filter(|u| !u.trim().is_empty()),
            http,
        })
    }

    /// CPU, memory and disk on a blocking thread, bounded by `acquisition_timeout`.
    async fn read(&self) -> Result<Reading, AcquisitionError> {
        let sys = self.sys.clone();
        let disks = self.disks.clone();
        let task = tokio::task::spawn_blocking(move || -> Result<Reading, AcquisitionError> {
            let (cpu_percent, cpu_cores, memory_used, memory_total) = {
                let mut sys = sys.lock().map_err(|_| AcquisitionError::LockPoisoned)?;
                sys.refresh_cpu_all();
                sys.refresh_memory();
                let total = sys.total_memory();
                let used = total.saturating_sub(sys.available_memory());
                (
                    (sys.global_cpu_usage() as f64).clamp(0.0, 100.0),
                    sys.cpus().len() as u32,
                    used,
                    total,
                )
            };
            let disk = {
                let mut disks = disks.lock().map_err(|_| AcquisitionError::LockPoisoned)?;
                disks.refresh(true);
                pick_root_disk(
                    disks
                        .list()
                        .iter()
                        .map(|d| (d.mount_point(), d.total_space(), d.available_space())),
                )
                .ok_or(AcquisitionError::NoDisks)?
            };
            Ok(Reading {
                cpu_percent,
                cpu_cores,
                memory_used,
                memory_total,
                disk,
            })
        });
        let joined = tokio::time::timeout(self.acquisition_timeout, task)
            .await
            .map_err(|_| AcquisitionError::Timeout(self.acquisition_timeout))?;
        joined?
    }

    /// Full host card for the dashboard: usage plus identity and address.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "host_stats"))]
    pub async fn host_stats(&self) -> anyhow::Result<HostStats> {
        let r = self.read().await?;
        let host_ip = match &self.public_ip_url {
            Some(url) => ip::public_ip(&self.http, url).await,
            None => ip::local_ip(),
        };
        let disk_percent = if r.disk.total > 0 {
            (r.disk.used as f64 / r.disk.total as f64) * 100.0
        } else {
            0.0
        };
        let host_os = os_pretty_name();
        Ok(HostStats {
            cpu_percent: r.cpu_percent,
            cpu_cores: r.cpu_cores,
            memory_used: r.memory_used,
            memory_total: r.memory_total,
            disk_used: r.disk.used,
            disk_total: r.disk.total,
            disk_percent,
            host_name: System::host_name().unwrap_or_default(),
            host_os,
            host_ip,
            uptime: System::uptime(),
            timestamp: Utc::now().timestamp_millis(),
        })
    }
}

#[async_trait]
impl HostStatsSource for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "sample"))]
    async fn sample(&self) -> Result<HostSample, AcquisitionError> {
        let r = self.read().await?;
        Ok(HostSample {
            cpu_percent: r.cpu_percent,
            memory_used_bytes: r.memory_used,
            disk_used_bytes: r.disk.used,
            timestamp: Utc::now(),
        })
    }
}
