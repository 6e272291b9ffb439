// Dashboard settings in SQLite: per-container display overrides and the app settings row.

use crate::models::{AppSettings, ContainerSettings, ContainerSettingsUpdate};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use std::collections::HashMap;
use tracing::instrument;

const DEFAULT_THEME: &str = "dark";
const DEFAULT_LANGUAGE: &str = "en";

pub struct SettingsRepo {
    pool: SqlitePool,
}

impl SettingsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables and seed the app settings row if missing.
    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS container_settings (
                id TEXT PRIMARY KEY,
                alias TEXT NOT NULL DEFAULT '',
                icon TEXT NOT NULL DEFAULT '',
                group_name TEXT NOT NULL DEFAULT '',
                hidden INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS app_settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                theme TEXT NOT NULL DEFAULT 'dark',
                language TEXT NOT NULL DEFAULT 'en',
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_settings")
            .fetch_one(&self.pool)
            .await?;
        if existing == 0 {
            sqlx::query("INSERT INTO app_settings (theme, language, updated_at) VALUES ($1, $2, $3)")
                .bind(DEFAULT_THEME)
                .bind(DEFAULT_LANGUAGE)
                .bind(Utc::now().timestamp_millis())
                .execute(&self.pool)
                .await?;
            tracing::info!("Seeded default app settings");
        }
        Ok(())
    }

    #[instrument(skip(self), fields(repo = "settings", operation = "all_container_settings"))]
    pub async fn all_container_settings(
        &self,
    ) -> anyhow::Result<HashMap<String, ContainerSettings>> {
        let rows = sqlx::query(
            "SELECT id, alias, icon, group_name, hidden, created_at, updated_at FROM container_settings",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut out = HashMap::with_capacity(rows.len());
        for row in rows {
            let s = parse_container_row(&row)?;
            out.insert(s.id.clone(), s);
        }
        Ok(out)
    }

    /// First-or-init by id, then overwrite alias/icon/group_name. `hidden` and `created_at` survive updates.
    #[instrument(skip(self, update), fields(repo = "settings", operation = "save_container_settings", id = %update.id))]
    pub async fn save_container_settings(
        &self,
        update: &ContainerSettingsUpdate,
    ) -> anyhow::Result<ContainerSettings> {
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            r#"
            INSERT INTO container_settings (id, alias, icon, group_name, hidden, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, $5, $5)
            ON CONFLICT(id) DO UPDATE SET
                alias = excluded.alias,
                icon = excluded.icon,
                group_name = excluded.group_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&update.id)
        .bind(&update.alias)
        .bind(&update.icon)
        .bind(&update.group_name)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, alias, icon, group_name, hidden, created_at, updated_at FROM container_settings WHERE id = $1",
        )
        .bind(&update.id)
        .fetch_one(&self.pool)
        .await?;
        parse_container_row(&row)
    }

    #[instrument(skip(self), fields(repo = "settings", operation = "app_settings"))]
    pub async fn app_settings(&self) -> anyhow::Result<AppSettings> {
        let row = sqlx::query(
            "SELECT id, theme, language, updated_at FROM app_settings ORDER BY id ASC LIMIT 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(AppSettings {
            id: row.try_get("id")?,
            theme: row.try_get("theme")?,
            language: row.try_get("language")?,
            updated_at: millis_to_utc(row.try_get("updated_at")?)?,
        })
    }
}

fn parse_container_row(row: &SqliteRow) -> anyhow::Result<ContainerSettings> {
    Ok(ContainerSettings {
        id: row.try_get("id")?,
        alias: row.try_get("alias")?,
        icon: row.try_get("icon")?,
        group_name: row.try_get("group_name")?,
        hidden: row.try_get("hidden")?,
        created_at: millis_to_utc(row.try_get("created_at")?)?,
        updated_at: millis_to_utc(row.try_get("updated_at")?)?,
    })
}

fn millis_to_utc(ms: i64) -> anyhow::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| anyhow::anyhow!("timestamp out of range: {}", ms))
}
