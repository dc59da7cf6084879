use crate::application::ports::{
    CatalogStore, ConnectivityObserver, CreateReportInput, OfflineResourcePayload, RemoteApi,
    ReportResourceInput, ReportStore,
};
use crate::domain::entities::{OfflineReport, ResourceRecord};
use crate::domain::value_objects::ReportSyncState;
use crate::shared::error::{AppError, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Turns a pending offline report into server-confirmed state.
///
/// Runs are keyed per report: the in-flight set rejects a duplicate attempt
/// on the same report while distinct reports reconcile concurrently. A report
/// in the set is "syncing"; the persisted status only moves to synced/error
/// once the run settles.
pub struct ReconcileService {
    catalog: Arc<dyn CatalogStore>,
    reports: Arc<dyn ReportStore>,
    remote: Arc<dyn RemoteApi>,
    connectivity: Arc<dyn ConnectivityObserver>,
    in_flight: Mutex<HashSet<String>>,
}

struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.id);
        }
    }
}

impl ReconcileService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        reports: Arc<dyn ReportStore>,
        remote: Arc<dyn RemoteApi>,
        connectivity: Arc<dyn ConnectivityObserver>,
    ) -> Self {
        Self {
            catalog,
            reports,
            remote,
            connectivity,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub async fn reconcile(&self, report_id: &str) -> Result<OfflineReport> {
        if !self.connectivity.is_online() {
            return Err(AppError::NetworkFailure(
                "an internet connection is required to sync this report".to_string(),
            ));
        }

        let guard = {
            let mut set = self
                .in_flight
                .lock()
                .map_err(|_| AppError::Internal("in-flight set poisoned".to_string()))?;
            if !set.insert(report_id.to_string()) {
                return Err(AppError::ValidationError(
                    "this report is already being synced".to_string(),
                ));
            }
            InFlightGuard {
                set: &self.in_flight,
                id: report_id.to_string(),
            }
        };
        let _guard = guard;

        self.reconcile_inner(report_id).await
    }

    async fn reconcile_inner(&self, report_id: &str) -> Result<OfflineReport> {
        let mut report = self
            .reports
            .get_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("offline report {report_id}")))?;

        if report.sync_status.is_terminal() {
            return Err(AppError::ValidationError(
                "this report was already synced".to_string(),
            ));
        }

        // Local invariants first; nothing leaves the device until they hold.
        if let Err(message) = report.validate_for_submission() {
            return Err(AppError::ValidationError(message));
        }

        if let Err(err) = self.resolve_temp_resources(&mut report).await {
            self.mark_error(report_id, &err).await;
            return Err(err);
        }

        match self.submit(&report).await {
            Ok(created) => {
                let synced_at = Utc::now();
                self.reports
                    .mark_sync_result(report_id, ReportSyncState::Synced, None, Some(synced_at))
                    .await?;
                info!(report_id, server_id = %created.id, "offline report synced");
                self.reports
                    .get_by_id(report_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("offline report {report_id}")))
            }
            Err(err) => {
                // Resources promoted above stay promoted: a retry finds no
                // temporary codes and will not re-create them.
                self.mark_error(report_id, &err).await;
                Err(err)
            }
        }
    }

    /// Create every temp-coded resource server-side in one batch, then
    /// promote the mirror records and rewrite all stored reports before
    /// reloading this one.
    async fn resolve_temp_resources(&self, report: &mut OfflineReport) -> Result<()> {
        let temp_ids: Vec<String> = report
            .temp_coded_resources()
            .iter()
            .map(|r| r.resource_id.clone())
            .collect();
        if temp_ids.is_empty() {
            return Ok(());
        }

        let mut payloads = Vec::with_capacity(temp_ids.len());
        for temp_id in &temp_ids {
            let record = self.catalog.get_resource(temp_id).await?.ok_or_else(|| {
                AppError::NetworkFailure(format!(
                    "offline resource {temp_id} is no longer present locally; it cannot be created on the server"
                ))
            })?;
            payloads.push(creation_payload(record));
        }

        info!(
            report_id = %report.id,
            count = payloads.len(),
            "creating offline resources on the server"
        );
        let mappings = self.remote.create_resources_from_offline(payloads).await?;

        for mapping in &mappings {
            self.catalog
                .promote_offline_resource(&mapping.temp_id, &mapping.real_id, &mapping.real_code)
                .await?;
            let rewritten = self
                .reports
                .replace_temp_references(&mapping.temp_id, &mapping.real_id, &mapping.real_code)
                .await?;
            info!(
                temp_id = %mapping.temp_id,
                real_id = %mapping.real_id,
                rewritten,
                "offline resource promoted"
            );
        }

        // Reload so the submission below uses real identifiers.
        *report = self
            .reports
            .get_by_id(&report.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("offline report {}", report.id)))?;

        if !report.temp_coded_resources().is_empty() {
            return Err(AppError::NetworkFailure(
                "some offline resources were not assigned a server identity".to_string(),
            ));
        }
        Ok(())
    }

    async fn submit(&self, report: &OfflineReport) -> Result<crate::application::ports::CreatedReport> {
        let input = CreateReportInput {
            title: report.title.clone(),
            author_id: report.author_id.clone(),
            author_name: report.author_name.clone(),
            resources: report
                .resources
                .iter()
                .map(|r| ReportResourceInput {
                    resource_id: r.resource_id.clone(),
                    resource_code: r.resource_code.clone(),
                    resource_name: r.resource_name.clone(),
                    brand: r.brand.clone(),
                    status: r.status,
                    description: r.description.clone(),
                    evidence_urls: r.evidence_urls.clone(),
                    evidence_blobs: r.evidence_blobs.clone(),
                })
                .collect(),
            general_notes: report.general_notes.clone(),
            is_offline_sync: true,
            created_at: Some(report.created_at),
        };
        self.remote.create_report(input).await
    }

    async fn mark_error(&self, report_id: &str, err: &AppError) {
        if let Err(mark_err) = self
            .reports
            .mark_sync_result(
                report_id,
                ReportSyncState::Error,
                Some(err.user_message()),
                None,
            )
            .await
        {
            warn!(report_id, "could not record sync error: {mark_err}");
        }
    }
}

fn creation_payload(record: ResourceRecord) -> OfflineResourcePayload {
    let creation = record.creation.unwrap_or(crate::domain::entities::OfflineResourceFields {
        unit_price: 0.0,
        classification_id: None,
        unit_id: None,
        resource_type_id: None,
        cost_type_id: None,
        is_active: true,
        is_used: false,
    });
    OfflineResourcePayload {
        temp_id: record.id,
        name: record.name,
        description: record.description,
        unit_price: creation.unit_price,
        unit_id: creation.unit_id,
        classification_id: creation.classification_id,
        resource_type_id: creation.resource_type_id,
        cost_type_id: creation.cost_type_id,
        is_active: creation.is_active,
        is_fixed_asset: record.is_fixed_asset,
        is_used: creation.is_used,
    }
}
