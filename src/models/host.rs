// Live host stats for GET /api/stats/host

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostStats {
    pub cpu_percent: f64,
    pub cpu_cores: u32,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk_used: u64,
    pub disk_total: u64,
    pub disk_percent: f64,
    pub host_name: String,
    pub host_os: String,
    pub host_ip: String,
    /// Seconds since boot.
    pub uptime: u64,
    /// Unix milliseconds.
    pub timestamp: i64,
}
