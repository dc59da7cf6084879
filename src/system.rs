use crate::application::ports::{ConnectivityObserver, RemoteApi};
use crate::application::services::{
    AutoSyncService, CatalogSyncPipeline, ReconcileService, RefreshDecision, StatusService,
};
use crate::infrastructure::catalog::SqliteCatalogStore;
use crate::infrastructure::database::{LocalStore, SqliteConfigStore};
use crate::infrastructure::reports::SqliteReportStore;
use crate::shared::config::AppConfig;
use crate::shared::error::Result;
use std::sync::Arc;
use tracing::info;

/// Wires the local store, both persistence adapters and every service over a
/// caller-supplied transport and connectivity source.
pub struct OfflineSubsystem {
    pub local_store: Arc<LocalStore>,
    pub catalog: Arc<SqliteCatalogStore>,
    pub reports: Arc<SqliteReportStore>,
    pub pipeline: Arc<CatalogSyncPipeline>,
    pub auto_sync: Arc<AutoSyncService>,
    pub reconcile: Arc<ReconcileService>,
    pub status: Arc<StatusService>,
}

impl OfflineSubsystem {
    /// Open the local store and assemble the services. The auto-sync
    /// scheduler is not started; call [`start`](Self::start) for that.
    pub async fn new(
        config: &AppConfig,
        remote: Arc<dyn RemoteApi>,
        connectivity: Arc<dyn ConnectivityObserver>,
    ) -> Result<Self> {
        let local_store = Arc::new(LocalStore::new(&config.database));
        local_store.open().await?;

        let catalog = Arc::new(SqliteCatalogStore::new(Arc::clone(&local_store)));
        let reports = Arc::new(SqliteReportStore::new(Arc::clone(&local_store)));
        let config_store = Arc::new(SqliteConfigStore::new(Arc::clone(&local_store)));

        let pipeline = Arc::new(CatalogSyncPipeline::new(
            Arc::clone(&remote),
            catalog.clone(),
            config.sync.clone(),
        ));
        let auto_sync = Arc::new(AutoSyncService::new(
            Arc::clone(&remote),
            catalog.clone(),
            config_store,
            Arc::clone(&connectivity),
            config.sync.clone(),
        ));
        let reconcile = Arc::new(ReconcileService::new(
            catalog.clone(),
            reports.clone(),
            remote,
            Arc::clone(&connectivity),
        ));
        let status = Arc::new(StatusService::new(
            catalog.clone(),
            reports.clone(),
            connectivity,
            Arc::clone(&auto_sync),
        ));

        info!("offline subsystem assembled");
        Ok(Self {
            local_store,
            catalog,
            reports,
            pipeline,
            auto_sync,
            reconcile,
            status,
        })
    }

    /// Register the connectivity trigger and run the first-use freshness
    /// check.
    pub async fn start(&self) -> RefreshDecision {
        self.auto_sync.start().await
    }
}
