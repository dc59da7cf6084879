use crate::domain::entities::{
    CatalogCounts, CatalogSnapshot, ClassificationRecord, ResourceRecord, UnitRecord,
};
use crate::shared::error::Result;
use async_trait::async_trait;

/// Persistence seam for the catalog mirror.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Replace every backend-origin record with the snapshot's contents.
    /// Offline-origin resource records must come through unchanged.
    async fn replace_backend_catalog(&self, snapshot: CatalogSnapshot) -> Result<()>;

    /// Non-expired resources, optionally filtered by the fixed-asset flag.
    /// Offline-origin records are exempt from expiry.
    async fn read_resources(&self, fixed_asset: Option<bool>) -> Result<Vec<ResourceRecord>>;

    async fn read_units(&self) -> Result<Vec<UnitRecord>>;

    /// Flat classification records; callers wanting the hierarchy run them
    /// through `build_classification_tree`.
    async fn read_classifications(&self) -> Result<Vec<ClassificationRecord>>;

    /// Only user-created records, so schedulers and pickers can operate on
    /// them without scanning the whole mirror.
    async fn read_offline_resources(&self) -> Result<Vec<ResourceRecord>>;

    async fn get_resource(&self, id: &str) -> Result<Option<ResourceRecord>>;

    /// Insert or update a single offline-origin record without touching the
    /// rest of the mirror.
    async fn write_offline_resource(&self, record: ResourceRecord) -> Result<()>;

    /// Re-key a record from its temporary identity to the server-assigned
    /// one, flipping origin to backend.
    async fn promote_offline_resource(
        &self,
        temp_id: &str,
        real_id: &str,
        real_code: &str,
    ) -> Result<()>;

    /// Drop expired backend-origin resources; returns how many were removed.
    async fn clear_expired_resources(&self) -> Result<u64>;

    async fn counts(&self) -> Result<CatalogCounts>;
}
