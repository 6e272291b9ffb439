// Persisted dashboard settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-container display overrides, keyed by Docker container id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSettings {
    pub id: String,
    pub alias: String,
    pub icon: String,
    pub group_name: String,
    pub hidden: bool,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Body of POST /api/settings/container. Only display fields are writable; `hidden` is kept as stored.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSettingsUpdate {
    pub id: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub id: i64,
    pub theme: String,
    pub language: String,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}
