// Resource history store. The sampler is the only writer; history queries only read.

mod memory;
mod sqlite;

pub use memory::MemoryMetricsRepo;
pub use sqlite::SqliteMetricsRepo;

use crate::error::StorageError;
use crate::models::Snapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait MetricStore: Send + Sync {
    async fn append(&self, snapshot: &Snapshot) -> Result<(), StorageError>;

    /// All snapshots with `timestamp >= since`, ascending by timestamp.
    async fn query_range(&self, since: DateTime<Utc>) -> Result<Vec<Snapshot>, StorageError>;

    /// Remove every snapshot with `timestamp < cutoff`. Returns rows removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError>;
}
