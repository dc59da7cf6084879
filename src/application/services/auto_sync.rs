use crate::application::ports::{
    CatalogStore, ConfigStore, ConnectivityObserver, RemoteApi, LAST_AUTO_SYNC_KEY,
};
use crate::application::services::catalog_sync::{CatalogSyncPipeline, RefreshOutcome};
use crate::shared::config::SyncConfig;
use crate::shared::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What `ensure_fresh_if_needed` decided to do. Failures are absorbed here so
/// defensive calls from read paths never break the caller; the next eligible
/// trigger retries because `last_auto_sync` stays untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshDecision {
    Offline,
    AlreadySyncing,
    Fresh,
    Refreshed(RefreshOutcome),
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct AutoSyncStatus {
    pub last_auto_sync: Option<DateTime<Utc>>,
    pub hours_since_last_sync: Option<f64>,
    pub needs_sync: bool,
    pub is_online: bool,
}

/// Decides *when* the catalog mirror refreshes: on first use and whenever
/// connectivity returns, gated by the empty-store / staleness rule. At most
/// one refresh runs at a time; triggers arriving mid-flight are dropped, not
/// queued.
pub struct AutoSyncService {
    pipeline: CatalogSyncPipeline,
    catalog: Arc<dyn CatalogStore>,
    config_store: Arc<dyn ConfigStore>,
    connectivity: Arc<dyn ConnectivityObserver>,
    policy: SyncConfig,
    /// Unix millis of the last successful refresh; 0 means never.
    last_auto_sync_ms: AtomicI64,
    is_syncing: AtomicBool,
}

struct RefreshLock<'a>(&'a AtomicBool);

impl Drop for RefreshLock<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AutoSyncService {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        catalog: Arc<dyn CatalogStore>,
        config_store: Arc<dyn ConfigStore>,
        connectivity: Arc<dyn ConnectivityObserver>,
        policy: SyncConfig,
    ) -> Self {
        Self {
            pipeline: CatalogSyncPipeline::new(remote, Arc::clone(&catalog), policy.clone()),
            catalog,
            config_store,
            connectivity,
            policy,
            last_auto_sync_ms: AtomicI64::new(0),
            is_syncing: AtomicBool::new(false),
        }
    }

    /// Load persisted bookkeeping, hook the connectivity-restored trigger and
    /// run the first-use check. Call once after construction.
    pub async fn start(self: &Arc<Self>) -> RefreshDecision {
        self.load_last_sync().await;

        let service = Arc::clone(self);
        self.connectivity.subscribe_online(Box::new(move || {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                info!("connectivity restored, checking catalog freshness");
                service.ensure_fresh_if_needed().await;
            });
        }));

        self.ensure_fresh_if_needed().await
    }

    /// Safe to call from any read path: the staleness gate and the in-process
    /// lock keep redundant network activity out.
    pub async fn ensure_fresh_if_needed(&self) -> RefreshDecision {
        if !self.connectivity.is_online() {
            debug!("offline, skipping refresh check");
            return RefreshDecision::Offline;
        }
        if self.is_syncing.load(Ordering::SeqCst) {
            debug!("refresh already in flight, dropping trigger");
            return RefreshDecision::AlreadySyncing;
        }

        match self.needs_refresh().await {
            Ok(true) => {}
            Ok(false) => return RefreshDecision::Fresh,
            Err(err) => {
                warn!("could not evaluate refresh need: {err}");
                return RefreshDecision::Failed(err.user_message());
            }
        }

        if self
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return RefreshDecision::AlreadySyncing;
        }
        let _lock = RefreshLock(&self.is_syncing);

        match self.pipeline.run().await {
            Ok(outcome) => {
                self.record_success().await;
                RefreshDecision::Refreshed(outcome)
            }
            Err(err) => {
                // last_auto_sync stays unchanged so the next trigger retries.
                warn!("automatic catalog refresh failed: {err}");
                RefreshDecision::Failed(err.user_message())
            }
        }
    }

    /// Explicit user-requested refresh; errors propagate.
    pub async fn force_refresh(&self) -> Result<RefreshOutcome> {
        if self
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::ValidationError(
                "a catalog refresh is already in progress".to_string(),
            ));
        }
        let _lock = RefreshLock(&self.is_syncing);

        let outcome = self.pipeline.run().await?;
        self.record_success().await;
        Ok(outcome)
    }

    pub fn status(&self) -> AutoSyncStatus {
        let last_ms = self.last_auto_sync_ms.load(Ordering::SeqCst);
        let last = (last_ms > 0).then(|| DateTime::from_timestamp_millis(last_ms).unwrap_or_default());
        let hours = last.map(|ts| (Utc::now() - ts).num_minutes() as f64 / 60.0);
        AutoSyncStatus {
            last_auto_sync: last,
            hours_since_last_sync: hours,
            needs_sync: match hours {
                None => true,
                Some(h) => h >= self.policy.refresh_interval_hours as f64,
            },
            is_online: self.connectivity.is_online(),
        }
    }

    async fn needs_refresh(&self) -> Result<bool> {
        let counts = self.catalog.counts().await?;
        if counts.is_empty() {
            info!("catalog mirror empty, bootstrapping");
            return Ok(true);
        }

        let last_ms = self.last_auto_sync_ms.load(Ordering::SeqCst);
        if last_ms == 0 {
            return Ok(true);
        }
        let elapsed = Utc::now()
            - DateTime::from_timestamp_millis(last_ms)
                .ok_or_else(|| AppError::Internal("invalid last sync timestamp".to_string()))?;
        Ok(elapsed >= self.policy.refresh_interval())
    }

    async fn load_last_sync(&self) {
        match self.config_store.get_value(LAST_AUTO_SYNC_KEY).await {
            Ok(Some(value)) => {
                let ms = value.parse::<i64>().unwrap_or(0);
                self.last_auto_sync_ms.store(ms, Ordering::SeqCst);
                debug!(last_auto_sync_ms = ms, "loaded sync bookkeeping");
            }
            Ok(None) => debug!("no previous sync timestamp"),
            Err(err) => warn!("could not load sync timestamp: {err}"),
        }
    }

    async fn record_success(&self) {
        let now_ms = Utc::now().timestamp_millis();
        self.last_auto_sync_ms.store(now_ms, Ordering::SeqCst);
        if let Err(err) = self
            .config_store
            .set_value(LAST_AUTO_SYNC_KEY, &now_ms.to_string())
            .await
        {
            warn!("could not persist sync timestamp: {err}");
        }
    }
}
