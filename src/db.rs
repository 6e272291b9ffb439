// SQLite pool shared by the metrics and settings repos.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Connect to SQLite at `path`, create parent dir and DB if missing, enable WAL + pragmas.
pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_pool_size)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

/// Reclaim space after deletes (run periodically after pruning).
#[tracing::instrument(skip(pool), fields(repo = "db", operation = "vacuum"))]
pub async fn vacuum(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query("VACUUM").execute(pool).await?;
    Ok(())
}
