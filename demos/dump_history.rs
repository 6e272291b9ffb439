// Print the chart series /api/stats/history would serve, straight from the database.
//
// Usage: cargo run --example dump_history -- [DB_PATH] [PERIOD]
//   DB_PATH  default: ./data/dockdash.db
//   PERIOD   default: 1h (1h or 24h)

use dockdash::history_service::{DEFAULT_TARGET_POINTS, HistoryService};
use dockdash::metrics_repo::SqliteMetricsRepo;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("./data/dockdash.db");
    let period = args.get(2).map(String::as_str).unwrap_or("1h");

    let pool = dockdash::db::connect(path, 1).await?;
    let repo = Arc::new(SqliteMetricsRepo::new(pool));
    repo.init().await?;
    let history = HistoryService::new(repo, DEFAULT_TARGET_POINTS);
    let points = history.get_history(period).await?;

    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}
