// SQLite-backed metric store. Timestamps are stored as unix milliseconds.

use super::MetricStore;
use crate::error::StorageError;
use crate::models::Snapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::instrument;

pub struct SqliteMetricsRepo {
    pool: SqlitePool,
}

impl SqliteMetricsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS system_metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                cpu REAL NOT NULL,
                memory INTEGER NOT NULL,
                disk INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_system_metrics_created_at ON system_metrics(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn parse_row(row: &SqliteRow) -> Result<Snapshot, sqlx::Error> {
        let created_at: i64 = row.try_get("created_at")?;
        let cpu: f64 = row.try_get("cpu")?;
        let memory: i64 = row.try_get("memory")?;
        let disk: i64 = row.try_get("disk")?;
        let timestamp = DateTime::<Utc>::from_timestamp_millis(created_at).ok_or_else(|| {
            sqlx::Error::Decode(format!("created_at out of range: {}", created_at).into())
        })?;
        Ok(Snapshot {
            timestamp,
            cpu_percent: cpu,
            memory_used_bytes: memory as u64,
            disk_used_bytes: disk as u64,
        })
    }
}

#[async_trait]
impl MetricStore for SqliteMetricsRepo {
    #[instrument(skip(self, snapshot), fields(repo = "metrics", operation = "append"))]
    async fn append(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO system_metrics (created_at, cpu, memory, disk) VALUES ($1, $2, $3, $4)")
            .bind(snapshot.timestamp.timestamp_millis())
            .bind(snapshot.cpu_percent)
            .bind(snapshot.memory_used_bytes as i64)
            .bind(snapshot.disk_used_bytes as i64)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Write)?;
        Ok(())
    }

    #[instrument(skip(self), fields(repo = "metrics", operation = "query_range"))]
    async fn query_range(&self, since: DateTime<Utc>) -> Result<Vec<Snapshot>, StorageError> {
        let rows = sqlx::query(
            "SELECT created_at, cpu, memory, disk FROM system_metrics
             WHERE created_at >= $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(since.timestamp_millis())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Read)?;

        rows.iter()
            .map(Self::parse_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Read)
    }

    #[instrument(skip(self), fields(repo = "metrics", operation = "delete_older_than"))]
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError> {
        let r = sqlx::query("DELETE FROM system_metrics WHERE created_at < $1")
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(StorageError::Delete)?;
        Ok(r.rows_affected())
    }
}
