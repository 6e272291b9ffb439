// Resource history snapshot (one row per sampler tick)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point-in-time host reading. Wire keys match the dashboard chart: `timestamp`, `cpu`, `memory`, `disk`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "cpu")]
    pub cpu_percent: f64,
    #[serde(rename = "memory")]
    pub memory_used_bytes: u64,
    #[serde(rename = "disk")]
    pub disk_used_bytes: u64,
}

impl From<HostSample> for Snapshot {
    fn from(s: HostSample) -> Self {
        Self {
            timestamp: s.timestamp,
            cpu_percent: s.cpu_percent,
            memory_used_bytes: s.memory_used_bytes,
            disk_used_bytes: s.disk_used_bytes,
        }
    }
}

/// What the host-stats source hands the sampler each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSample {
    pub cpu_percent: f64,
    pub memory_used_bytes: u64,
    pub disk_used_bytes: u64,
    pub timestamp: DateTime<Utc>,
}
