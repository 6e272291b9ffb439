use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// Snapshots older than this are pruned. 25h keeps a full 24h chart.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u32,
    /// Optional cron expression for VACUUM (e.g. "0 0 3 * * *" = 03:00 daily). Uses local time.
    #[serde(default)]
    pub vacuum_schedule: Option<String>,
    /// Run VACUUM every N seconds when vacuum_schedule is not set.
    #[serde(default = "default_vacuum_interval_secs")]
    pub vacuum_interval_secs: u64,
}

fn default_retention_hours() -> u32 {
    25
}

fn default_vacuum_interval_secs() -> u64 {
    24 * 60 * 60
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Prune only on ticks whose wall-clock minute is a multiple of this.
    #[serde(default = "default_prune_every_minutes")]
    pub prune_every_minutes: u32,
    /// Upper bound on one host stats read.
    #[serde(default = "default_acquisition_timeout_secs")]
    pub acquisition_timeout_secs: u64,
    /// How often to log sampler totals at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            prune_every_minutes: default_prune_every_minutes(),
            acquisition_timeout_secs: default_acquisition_timeout_secs(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_prune_every_minutes() -> u32 {
    10
}

fn default_acquisition_timeout_secs() -> u64 {
    10
}

fn default_stats_log_interval_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Max points returned by /api/stats/history before downsampling kicks in.
    #[serde(default = "default_target_points")]
    pub target_points: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            target_points: default_target_points(),
        }
    }
}

fn default_target_points() -> usize {
    300
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    /// Plain-text "what is my IP" endpoint. Unset = report the local outbound address only.
    #[serde(default)]
    pub public_ip_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            dist_dir: default_dist_dir(),
        }
    }
}

fn default_dist_dir() -> String {
    "frontend/dist".into()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("read config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.retention_hours > 0,
            "database.retention_hours must be > 0, got {}",
            self.database.retention_hours
        );
        anyhow::ensure!(
            self.database.vacuum_interval_secs > 0,
            "database.vacuum_interval_secs must be > 0, got {}",
            self.database.vacuum_interval_secs
        );
        if let Some(schedule) = &self.database.vacuum_schedule {
            anyhow::ensure!(
                !schedule.trim().is_empty(),
                "database.vacuum_schedule must be non-empty when set"
            );
        }
        anyhow::ensure!(
            self.sampler.interval_secs > 0,
            "sampler.interval_secs must be > 0, got {}",
            self.sampler.interval_secs
        );
        anyhow::ensure!(
            (1..=60).contains(&self.sampler.prune_every_minutes),
            "sampler.prune_every_minutes must be between 1 and 60, got {}",
            self.sampler.prune_every_minutes
        );
        anyhow::ensure!(
            self.sampler.acquisition_timeout_secs > 0,
            "sampler.acquisition_timeout_secs must be > 0, got {}",
            self.sampler.acquisition_timeout_secs
        );
        anyhow::ensure!(
            self.sampler.stats_log_interval_secs > 0,
            "sampler.stats_log_interval_secs must be > 0, got {}",
            self.sampler.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.history.target_points > 0,
            "history.target_points must be > 0, got {}",
            self.history.target_points
        );
        anyhow::ensure!(
            !self.frontend.dist_dir.is_empty(),
            "frontend.dist_dir must be non-empty"
        );
        Ok(())
    }
}
