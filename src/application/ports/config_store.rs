use crate::shared::error::Result;
use async_trait::async_trait;

/// Arbitrary key/value app configuration (sync bookkeeping lives here).
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<String>>;
    async fn set_value(&self, key: &str, value: &str) -> Result<()>;
}

/// Key under which the last successful automatic catalog refresh is stored,
/// as Unix milliseconds.
pub const LAST_AUTO_SYNC_KEY: &str = "last_auto_sync";
