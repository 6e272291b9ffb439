// Reduce a raw Docker stats API response to the dashboard's ContainerStats.

use crate::models::ContainerStats;
use bollard::models::ContainerStatsResponse;

/// Memory usage/limit and CPU percent from the cpu/precpu deltas. Missing sections read as zero.
pub(crate) fn process_statistics(s: &ContainerStatsResponse) -> ContainerStats {
    let memory_usage = s.memory_stats.as_ref().and_then(|m| m.usage).unwrap_or(0);
    let memory_limit = s.memory_stats.as_ref().and_then(|m| m.limit).unwrap_or(0);
    let memory_percent = if memory_limit > 0 {
        memory_usage as f64 / memory_limit as f64 * 100.0
    } else {
        0.0
    };

    ContainerStats {
        memory_usage,
        memory_limit,
        memory_percent,
        cpu_percent: cpu_percent(s),
    }
}

fn cpu_percent(s: &ContainerStatsResponse) -> f64 {
    let (Some(cpu_stats), Some(precpu_stats)) = (s.cpu_stats.as_ref(), s.precpu_stats.as_ref())
    else {
        return 0.0;
    };
    let total = cpu_stats
        .cpu_usage
        .as_ref()
        .and_then(|u| u.total_usage)
        .unwrap_or(0) as i64;
    let pre_total = precpu_stats
        .cpu_usage
        .as_ref()
        .and_then(|u| u.total_usage)
        .unwrap_or(0) as i64;
    let cpu_delta = total - pre_total;
    let system_delta = cpu_stats.system_cpu_usage.unwrap_or(0) as i64
        - precpu_stats.system_cpu_usage.unwrap_or(0) as i64;
    let online = cpu_stats.online_cpus.unwrap_or(1) as f64;
    if system_delta > 0 && cpu_delta > 0 && online > 0.0 {
        (cpu_delta as f64 / system_delta as f64) * online * 100.0
    } else {
        0.0
    }
}
