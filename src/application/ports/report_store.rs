use crate::domain::entities::{OfflineReport, OfflineReportDraft, OfflineReportPatch, ReportStats};
use crate::domain::value_objects::ReportSyncState;
use crate::shared::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence seam for offline reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Assigns an id, sets the pending lifecycle state, computes totals and
    /// persists before returning.
    async fn create(&self, draft: OfflineReportDraft) -> Result<OfflineReport>;

    /// Rejected unless the stored report is still pending.
    async fn update(&self, id: &str, patch: OfflineReportPatch) -> Result<OfflineReport>;

    async fn list_all(&self) -> Result<Vec<OfflineReport>>;

    async fn get_by_id(&self, id: &str) -> Result<Option<OfflineReport>>;

    async fn list_by_status(&self, status: ReportSyncState) -> Result<Vec<OfflineReport>>;

    /// Sole lifecycle mutator used by the reconciliation engine.
    async fn mark_sync_result(
        &self,
        id: &str,
        status: ReportSyncState,
        error: Option<String>,
        synced_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Rewrite every stored report (any status) whose resources reference the
    /// temporary identifier; returns how many reports changed.
    async fn replace_temp_references(
        &self,
        temp_id: &str,
        real_id: &str,
        real_code: &str,
    ) -> Result<u64>;

    /// Explicit user deletion; reports are never auto-deleted.
    async fn delete(&self, id: &str) -> Result<()>;

    async fn stats(&self) -> Result<ReportStats>;
}
