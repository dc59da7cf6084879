use crate::domain::value_objects::{EvidenceBlob, ResourceStatus};
use crate::shared::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw catalog shapes as the transport delivers them. Fields the backend may
/// omit are optional here; the single mapping seam in `catalog_sync` decides
/// what is droppable and what gets a default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteResource {
    pub id: Option<String>,
    pub resource_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_fixed_asset: Option<bool>,
    pub unit: Option<RemoteLabel>,
    pub resource_type: Option<RemoteLabel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteLabel {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteUnit {
    pub id: Option<String>,
    pub unit_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Classifications arrive nested (`childs`, arbitrary depth) and are
/// flattened at the mapping seam.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteClassification {
    pub id: Option<String>,
    pub name: Option<String>,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub childs: Vec<RemoteClassification>,
}

/// One resource line of a report submission.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResourceInput {
    pub resource_id: String,
    pub resource_code: String,
    pub resource_name: String,
    pub brand: String,
    pub status: ResourceStatus,
    pub description: String,
    pub evidence_urls: Vec<String>,
    pub evidence_blobs: Vec<EvidenceBlob>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateReportInput {
    pub title: String,
    pub author_id: String,
    pub author_name: String,
    pub resources: Vec<ReportResourceInput>,
    pub general_notes: String,
    pub is_offline_sync: bool,
    /// Original authoring time, so server-side chronology matches when the
    /// report was written, not when it was synced.
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedReport {
    pub id: String,
    pub report_number: Option<String>,
}

/// Creation payload for one offline-created resource.
#[derive(Debug, Clone, Serialize)]
pub struct OfflineResourcePayload {
    pub temp_id: String,
    pub name: String,
    pub description: String,
    pub unit_price: f64,
    pub unit_id: Option<String>,
    pub classification_id: Option<String>,
    pub resource_type_id: Option<String>,
    pub cost_type_id: Option<String>,
    pub is_active: bool,
    pub is_fixed_asset: bool,
    pub is_used: bool,
}

/// Server-assigned identity for a promoted offline resource.
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionMapping {
    pub temp_id: String,
    pub real_id: String,
    pub real_code: String,
}

/// The GraphQL-shaped network transport, treated as an opaque contract.
/// Timeouts are the transport's concern and surface as ordinary failures.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn fetch_all_resources(&self, is_fixed_asset: bool) -> Result<Vec<RemoteResource>>;
    async fn fetch_all_units(&self) -> Result<Vec<RemoteUnit>>;
    async fn fetch_all_classifications(&self) -> Result<Vec<RemoteClassification>>;
    async fn create_report(&self, input: CreateReportInput) -> Result<CreatedReport>;
    async fn create_resources_from_offline(
        &self,
        payloads: Vec<OfflineResourcePayload>,
    ) -> Result<Vec<PromotionMapping>>;
}
