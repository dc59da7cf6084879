use crate::application::ports::ConfigStore;
use crate::infrastructure::database::LocalStore;
use crate::shared::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Key/value configuration backed by the `app_config` table.
pub struct SqliteConfigStore {
    store: Arc<LocalStore>,
}

impl SqliteConfigStore {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let pool = self.store.acquire().await?;
        let value = sqlx::query_scalar("SELECT value FROM app_config WHERE key = ?")
            .bind(key)
            .fetch_optional(&pool)
            .await?;
        Ok(value)
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let pool = self.store.acquire().await?;
        sqlx::query(
            r#"
            INSERT INTO app_config (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(&pool)
        .await?;
        Ok(())
    }
}
