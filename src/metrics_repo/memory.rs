// In-memory metric store for tests and embedders that don't want SQLite.

use super::MetricStore;
use crate::error::StorageError;
use crate::models::Snapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryMetricsRepo {
    snapshots: RwLock<Vec<Snapshot>>,
}

impl MemoryMetricsRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait]
impl MetricStore for MemoryMetricsRepo {
    async fn append(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        self.snapshots.write().await.push(*snapshot);
        Ok(())
    }

    async fn query_range(&self, since: DateTime<Utc>) -> Result<Vec<Snapshot>, StorageError> {
        let mut out: Vec<Snapshot> = self
            .snapshots
            .read()
            .await
            .iter()
            .filter(|s| s.timestamp >= since)
            .copied()
            .collect();
        // Stable: equal timestamps keep insertion order, like ORDER BY created_at, id.
        out.sort_by_key(|s| s.timestamp);
        Ok(out)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError> {
        let mut guard = self.snapshots.write().await;
        let before = guard.len();
        guard.retain(|s| s.timestamp >= cutoff);
        Ok((before - guard.len()) as u64)
    }
}
