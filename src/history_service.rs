// Chart history: period selector -> time range -> raw snapshots -> stride downsampling.

use crate::error::HistoryError;
use crate::metrics_repo::MetricStore;
use crate::models::Snapshot;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::instrument;

/// Max points sent to the chart.
pub const DEFAULT_TARGET_POINTS: usize = 300;

/// History window presets. Anything unrecognized falls back to the last hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    LastHour,
    LastDay,
}

impl Period {
    pub fn parse(s: &str) -> Self {
        match s {
            "24h" => Period::LastDay,
            _ => Period::LastHour,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Period::LastHour => Duration::hours(1),
            Period::LastDay => Duration::hours(24),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::LastHour => "1h",
            Period::LastDay => "24h",
        }
    }
}

/// Pick points at a fractional stride `total / target`, flooring the cursor each step.
///
/// Selects existing points (no averaging). The output has `ceil(total / step)` entries,
/// which may be one over `target` because the cursor accumulates float error.
pub fn downsample<T: Clone>(points: Vec<T>, target: usize) -> Vec<T> {
    let total = points.len();
    if total <= target {
        return points;
    }
    let step = total as f64 / target as f64;
    let mut out = Vec::with_capacity(target + 1);
    let mut cursor = 0.0_f64;
    while cursor < total as f64 {
        let idx = cursor.floor() as usize;
        if idx < total {
            out.push(points[idx].clone());
        }
        cursor += step;
    }
    out
}

pub struct HistoryService {
    store: Arc<dyn MetricStore>,
    target_points: usize,
}

impl HistoryService {
    pub fn new(store: Arc<dyn MetricStore>, target_points: usize) -> Self {
        Self {
            store,
            target_points,
        }
    }

    #[instrument(skip(self), fields(service = "history", operation = "get_history"))]
    pub async fn get_history(&self, period: &str) -> Result<Vec<Snapshot>, HistoryError> {
        let period = Period::parse(period);
        let since = Utc::now() - period.duration();
        let raw = self.store.query_range(since).await?;
        let fetched = raw.len();
        let points = downsample(raw, self.target_points);
        tracing::debug!(
            period = period.as_str(),
            fetched,
            returned = points.len(),
            "history served"
        );
        Ok(points)
    }
}
