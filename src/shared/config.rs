use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://./data/inspections.db?mode=rwc`.
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Hours between automatic catalog refreshes.
    pub refresh_interval_hours: i64,
    /// Hours a mirrored resource record stays valid.
    pub resource_ttl_hours: i64,
    /// Days a mirrored unit/classification record stays valid.
    pub reference_ttl_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://./data/inspections.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            sync: SyncConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_interval_hours: 24,
            resource_ttl_hours: 24,
            reference_ttl_days: 30,
        }
    }
}

impl SyncConfig {
    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::hours(self.refresh_interval_hours)
    }

    pub fn resource_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.resource_ttl_hours)
    }

    pub fn reference_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.reference_ttl_days)
    }
}
