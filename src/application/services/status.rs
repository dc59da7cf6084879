use crate::application::ports::{CatalogStore, ConnectivityObserver, ReportStore};
use crate::application::services::auto_sync::AutoSyncService;
use crate::domain::entities::{CatalogCounts, ReportStats};
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// One-call view of the whole offline subsystem, for status surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatusSnapshot {
    pub catalog: CatalogCounts,
    pub reports: ReportStats,
    pub is_online: bool,
    pub last_auto_sync: Option<DateTime<Utc>>,
    pub catalog_needs_refresh: bool,
}

pub struct StatusService {
    catalog: Arc<dyn CatalogStore>,
    reports: Arc<dyn ReportStore>,
    connectivity: Arc<dyn ConnectivityObserver>,
    auto_sync: Arc<AutoSyncService>,
}

impl StatusService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        reports: Arc<dyn ReportStore>,
        connectivity: Arc<dyn ConnectivityObserver>,
        auto_sync: Arc<AutoSyncService>,
    ) -> Self {
        Self {
            catalog,
            reports,
            connectivity,
            auto_sync,
        }
    }

    pub async fn snapshot(&self) -> Result<SyncStatusSnapshot> {
        let catalog = self.catalog.counts().await?;
        let reports = self.reports.stats().await?;
        let auto_sync = self.auto_sync.status();
        Ok(SyncStatusSnapshot {
            catalog,
            reports,
            is_online: self.connectivity.is_online(),
            last_auto_sync: auto_sync.last_auto_sync,
            catalog_needs_refresh: auto_sync.needs_sync,
        })
    }
}
