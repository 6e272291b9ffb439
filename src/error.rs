// Error taxonomy for the sampling and history paths.
// Sampler-side errors are logged and absorbed; only HistoryError reaches an HTTP caller.

use std::time::Duration;

/// Reading host stats failed. The sampler skips the tick.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("host stats timed out after {0:?}")]
    Timeout(Duration),
    #[error("host stats task join: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("sysinfo lock poisoned")]
    LockPoisoned,
    #[error("no disks reported by the OS")]
    NoDisks,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("append snapshot: {0}")]
    Write(#[source] sqlx::Error),
    #[error("query snapshots: {0}")]
    Read(#[source] sqlx::Error),
    #[error("delete snapshots: {0}")]
    Delete(#[source] sqlx::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to fetch history: {0}")]
    Fetch(#[from] StorageError),
}
