use crate::shared::config::DatabaseConfig;
use crate::shared::error::{AppError, Result};
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Bumped whenever the table set changes; `apply_schema` re-runs the full
/// DDL (all statements are IF NOT EXISTS) and records the new version.
const SCHEMA_VERSION: i64 = 4;

const TABLES: [&str; 5] = [
    "resources",
    "units",
    "classifications",
    "offline_reports",
    "app_config",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS resources (
    id TEXT PRIMARY KEY,
    resource_code TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    is_fixed_asset INTEGER NOT NULL DEFAULT 0,
    unit_label TEXT,
    resource_type_label TEXT,
    origin TEXT NOT NULL DEFAULT 'backend',
    fetched_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL,
    creation_json TEXT
);
CREATE INDEX IF NOT EXISTS idx_resources_origin ON resources(origin);
CREATE INDEX IF NOT EXISTS idx_resources_code ON resources(resource_code);
CREATE INDEX IF NOT EXISTS idx_resources_name ON resources(name);
CREATE INDEX IF NOT EXISTS idx_resources_fixed_asset ON resources(is_fixed_asset);
CREATE INDEX IF NOT EXISTS idx_resources_expires ON resources(expires_at);

CREATE TABLE IF NOT EXISTS units (
    id TEXT PRIMARY KEY,
    unit_code TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    fetched_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_units_code ON units(unit_code);
CREATE INDEX IF NOT EXISTS idx_units_expires ON units(expires_at);

CREATE TABLE IF NOT EXISTS classifications (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    parent_id TEXT,
    fetched_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_classifications_parent ON classifications(parent_id);
CREATE INDEX IF NOT EXISTS idx_classifications_expires ON classifications(expires_at);

CREATE TABLE IF NOT EXISTS offline_reports (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    resources_json TEXT NOT NULL,
    general_notes TEXT NOT NULL DEFAULT '',
    author_id TEXT NOT NULL,
    author_name TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    synced_at INTEGER,
    sync_status TEXT NOT NULL DEFAULT 'pending',
    sync_error TEXT,
    version INTEGER NOT NULL DEFAULT 1,
    total_resources INTEGER NOT NULL DEFAULT 0,
    total_images INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_offline_reports_status ON offline_reports(sync_status);
CREATE INDEX IF NOT EXISTS idx_offline_reports_created ON offline_reports(created_at);
CREATE INDEX IF NOT EXISTS idx_offline_reports_author ON offline_reports(author_id);

CREATE TABLE IF NOT EXISTS app_config (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: u64,
}

/// Owns the SQLite pool for every local collection. The handle self-heals: a
/// closed or missing pool is reopened on the next acquire, and a table
/// dropped out from under us is recreated by `ensure_collections_exist`.
pub struct LocalStore {
    url: String,
    max_connections: u32,
    pool: RwLock<Option<SqlitePool>>,
}

impl LocalStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            pool: RwLock::new(None),
        }
    }

    /// Private in-memory store; the single connection keeps the database
    /// alive for the pool's lifetime.
    pub fn in_memory() -> Self {
        Self {
            url: ":memory:".to_string(),
            max_connections: 1,
            pool: RwLock::new(None),
        }
    }

    /// Connect and bring the schema up to date. Safe to call repeatedly.
    pub async fn open(&self) -> Result<()> {
        let mut slot = self.pool.write().await;
        if let Some(pool) = slot.as_ref() {
            if !pool.is_closed() {
                return Ok(());
            }
        }
        *slot = Some(self.connect().await?);
        Ok(())
    }

    /// Pool handle for queries. Reopens a closed connection transparently.
    pub async fn acquire(&self) -> Result<SqlitePool> {
        {
            let slot = self.pool.read().await;
            if let Some(pool) = slot.as_ref() {
                if !pool.is_closed() {
                    return Ok(pool.clone());
                }
            }
        }

        let mut slot = self.pool.write().await;
        // Another task may have reopened while we waited for the write lock.
        if let Some(pool) = slot.as_ref() {
            if !pool.is_closed() {
                return Ok(pool.clone());
            }
        }
        warn!("local store handle was closed, reopening");
        let pool = self.connect().await?;
        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Verify every expected table exists; recreate missing ones. Returns the
    /// names that had to be recreated.
    pub async fn ensure_collections_exist(&self) -> Result<Vec<String>> {
        let pool = self.acquire().await?;
        let mut missing = Vec::new();
        for table in TABLES {
            let found: Option<String> = sqlx::query_scalar(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_optional(&pool)
            .await?;
            if found.is_none() {
                missing.push(table.to_string());
            }
        }

        if !missing.is_empty() {
            warn!(?missing, "local collections missing, recreating");
            apply_schema(&pool).await?;
        }
        Ok(missing)
    }

    /// Row counts per collection, for diagnostics surfaces.
    pub async fn stats(&self) -> Result<Vec<TableCount>> {
        let pool = self.acquire().await?;
        let mut counts = Vec::with_capacity(TABLES.len());
        for table in TABLES {
            let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&pool)
                .await?;
            counts.push(TableCount {
                table: table.to_string(),
                rows: rows as u64,
            });
        }
        Ok(counts)
    }

    pub async fn close(&self) {
        let mut slot = self.pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
        }
    }

    async fn connect(&self) -> Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.url)
            .await
            .map_err(|err| AppError::StoreUnavailable(err.to_string()))?;
        apply_schema(&pool).await?;
        Ok(pool)
    }
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    let current: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;

    sqlx::raw_sql(SCHEMA).execute(pool).await?;

    if current != SCHEMA_VERSION {
        sqlx::raw_sql(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
            .execute(pool)
            .await?;
        info!(
            from = current,
            to = SCHEMA_VERSION,
            "local store schema updated"
        );
    }
    Ok(())
}
