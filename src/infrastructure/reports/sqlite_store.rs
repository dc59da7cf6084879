use super::rows::ReportRow;
use crate::application::ports::ReportStore;
use crate::domain::entities::{
    count_images, OfflineReport, OfflineReportDraft, OfflineReportPatch, ReportStats,
};
use crate::domain::value_objects::ReportSyncState;
use crate::infrastructure::database::LocalStore;
use crate::shared::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const INSERT_REPORT: &str = r#"
INSERT INTO offline_reports (
    id, title, resources_json, general_notes, author_id, author_name,
    created_at, synced_at, sync_status, sync_error, version,
    total_resources, total_images
) VALUES (?, ?, ?, ?, ?, ?, ?, NULL, 'pending', NULL, 1, ?, ?)
"#;

fn new_report_id(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("offline-report-{}-{suffix}", now.timestamp_millis())
}

/// Offline report persistence. The resource lines live as a JSON column;
/// lifecycle fields are relational so status queries stay cheap.
pub struct SqliteReportStore {
    store: Arc<LocalStore>,
}

impl SqliteReportStore {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn create(&self, draft: OfflineReportDraft) -> Result<OfflineReport> {
        // Truncated to millisecond precision, matching what the row stores.
        let now = Utc::now();
        let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let report = OfflineReport {
            id: new_report_id(now),
            title: draft.title,
            general_notes: draft.general_notes,
            author_id: draft.author_id,
            author_name: draft.author_name,
            created_at: now,
            synced_at: None,
            sync_status: ReportSyncState::Pending,
            sync_error: None,
            version: 1,
            total_resources: draft.resources.len() as i64,
            total_images: count_images(&draft.resources),
            resources: draft.resources,
        };

        let pool = self.store.acquire().await?;
        sqlx::query(INSERT_REPORT)
            .bind(&report.id)
            .bind(&report.title)
            .bind(serde_json::to_string(&report.resources)?)
            .bind(&report.general_notes)
            .bind(&report.author_id)
            .bind(&report.author_name)
            .bind(report.created_at.timestamp_millis())
            .bind(report.total_resources)
            .bind(report.total_images)
            .execute(&pool)
            .await?;

        debug!(report_id = %report.id, resources = report.total_resources, "offline report stored");
        Ok(report)
    }

    async fn update(&self, id: &str, patch: OfflineReportPatch) -> Result<OfflineReport> {
        let pool = self.store.acquire().await?;
        let mut tx = pool.begin().await?;

        let row: Option<ReportRow> = sqlx::query_as("SELECT * FROM offline_reports WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut report = row
            .ok_or_else(|| AppError::NotFound(format!("offline report {id}")))?
            .into_report()?;

        if report.sync_status != ReportSyncState::Pending {
            return Err(AppError::ValidationError(format!(
                "report {id} is {} and can no longer be edited",
                report.sync_status
            )));
        }

        if let Some(title) = patch.title {
            report.title = title;
        }
        if let Some(resources) = patch.resources {
            report.resources = resources;
        }
        if let Some(notes) = patch.general_notes {
            report.general_notes = notes;
        }
        report.version += 1;
        report.total_resources = report.resources.len() as i64;
        report.total_images = count_images(&report.resources);

        sqlx::query(
            r#"
            UPDATE offline_reports
            SET title = ?, resources_json = ?, general_notes = ?,
                version = ?, total_resources = ?, total_images = ?
            WHERE id = ?
            "#,
        )
        .bind(&report.title)
        .bind(serde_json::to_string(&report.resources)?)
        .bind(&report.general_notes)
        .bind(report.version)
        .bind(report.total_resources)
        .bind(report.total_images)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(report)
    }

    async fn list_all(&self) -> Result<Vec<OfflineReport>> {
        let pool = self.store.acquire().await?;
        let rows: Vec<ReportRow> =
            sqlx::query_as("SELECT * FROM offline_reports ORDER BY created_at DESC")
                .fetch_all(&pool)
                .await?;
        rows.into_iter().map(ReportRow::into_report).collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<OfflineReport>> {
        let pool = self.store.acquire().await?;
        let row: Option<ReportRow> = sqlx::query_as("SELECT * FROM offline_reports WHERE id = ?")
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        row.map(ReportRow::into_report).transpose()
    }

    async fn list_by_status(&self, status: ReportSyncState) -> Result<Vec<OfflineReport>> {
        let pool = self.store.acquire().await?;
        let rows: Vec<ReportRow> = sqlx::query_as(
            "SELECT * FROM offline_reports WHERE sync_status = ? ORDER BY created_at DESC",
        )
        .bind(status.as_str())
        .fetch_all(&pool)
        .await?;
        rows.into_iter().map(ReportRow::into_report).collect()
    }

    async fn mark_sync_result(
        &self,
        id: &str,
        status: ReportSyncState,
        error: Option<String>,
        synced_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let pool = self.store.acquire().await?;
        let updated = sqlx::query(
            "UPDATE offline_reports SET sync_status = ?, sync_error = ?, synced_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(&error)
        .bind(synced_at.map(|ts| ts.timestamp_millis()))
        .bind(id)
        .execute(&pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("offline report {id}")));
        }
        Ok(())
    }

    async fn replace_temp_references(
        &self,
        temp_id: &str,
        real_id: &str,
        real_code: &str,
    ) -> Result<u64> {
        let pool = self.store.acquire().await?;
        let mut tx = pool.begin().await?;

        // LIKE narrows the scan; the JSON pass decides what actually changes.
        let rows: Vec<ReportRow> =
            sqlx::query_as("SELECT * FROM offline_reports WHERE resources_json LIKE ?")
                .bind(format!("%{temp_id}%"))
                .fetch_all(&mut *tx)
                .await?;

        let mut rewritten = 0u64;
        for row in rows {
            let id = row.id.clone();
            let mut report = row.into_report()?;
            let mut touched = false;
            for resource in &mut report.resources {
                if resource.resource_id == temp_id {
                    resource.resource_id = real_id.to_string();
                    resource.resource_code = real_code.to_string();
                    touched = true;
                }
            }
            if !touched {
                continue;
            }
            sqlx::query("UPDATE offline_reports SET resources_json = ? WHERE id = ?")
                .bind(serde_json::to_string(&report.resources)?)
                .bind(&id)
                .execute(&mut *tx)
                .await?;
            rewritten += 1;
        }

        tx.commit().await?;
        Ok(rewritten)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let pool = self.store.acquire().await?;
        let deleted = sqlx::query("DELETE FROM offline_reports WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("offline report {id}")));
        }
        Ok(())
    }

    async fn stats(&self) -> Result<ReportStats> {
        let pool = self.store.acquire().await?;
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT sync_status, COUNT(*) FROM offline_reports GROUP BY sync_status")
                .fetch_all(&pool)
                .await?;

        let mut stats = ReportStats::default();
        for (status, count) in rows {
            let count = count as u64;
            stats.total += count;
            match ReportSyncState::from(status.as_str()) {
                ReportSyncState::Pending => stats.pending += count,
                ReportSyncState::Synced => stats.synced += count,
                ReportSyncState::Error => stats.error += count,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EvaluatedResource;
    use crate::domain::value_objects::{generate_temp_code, generate_temp_id, ResourceStatus};

    async fn store() -> SqliteReportStore {
        let local = Arc::new(LocalStore::in_memory());
        local.open().await.unwrap();
        SqliteReportStore::new(local)
    }

    fn evaluated(id: &str, code: &str) -> EvaluatedResource {
        EvaluatedResource {
            resource_id: id.into(),
            resource_code: code.into(),
            resource_name: "Bench grinder".into(),
            brand: "Acme".into(),
            status: ResourceStatus::Operational,
            description: String::new(),
            evidence_urls: vec!["https://example.test/a.jpg".into()],
            evidence_blobs: vec![],
        }
    }

    fn draft(resources: Vec<EvaluatedResource>) -> OfflineReportDraft {
        OfflineReportDraft {
            title: "warehouse check".into(),
            resources,
            general_notes: "all clear".into(),
            author_id: "u1".into(),
            author_name: "Inspector".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_identity_and_pending_state() {
        let reports = store().await;
        let created = reports
            .create(draft(vec![evaluated("r1", "AF-001")]))
            .await
            .unwrap();

        assert!(created.id.starts_with("offline-report-"));
        assert_eq!(created.sync_status, ReportSyncState::Pending);
        assert_eq!(created.version, 1);
        assert_eq!(created.total_resources, 1);

        let loaded = reports.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn update_bumps_version_and_recomputes_totals() {
        let reports = store().await;
        let created = reports
            .create(draft(vec![evaluated("r1", "AF-001")]))
            .await
            .unwrap();

        let updated = reports
            .update(
                &created.id,
                OfflineReportPatch {
                    title: Some("warehouse recheck".into()),
                    resources: Some(vec![
                        evaluated("r1", "AF-001"),
                        evaluated("r2", "AF-002"),
                    ]),
                    general_notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "warehouse recheck");
        assert_eq!(updated.general_notes, "all clear");
        assert_eq!(updated.version, 2);
        assert_eq!(updated.total_resources, 2);
    }

    #[tokio::test]
    async fn non_pending_reports_refuse_updates() {
        let reports = store().await;
        let created = reports
            .create(draft(vec![evaluated("r1", "AF-001")]))
            .await
            .unwrap();
        reports
            .mark_sync_result(&created.id, ReportSyncState::Synced, None, Some(Utc::now()))
            .await
            .unwrap();

        let err = reports
            .update(&created.id, OfflineReportPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn mark_sync_result_sets_and_clears_error_state() {
        let reports = store().await;
        let created = reports
            .create(draft(vec![evaluated("r1", "AF-001")]))
            .await
            .unwrap();

        reports
            .mark_sync_result(
                &created.id,
                ReportSyncState::Error,
                Some("server rejected report".into()),
                None,
            )
            .await
            .unwrap();
        let failed = reports.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(failed.sync_status, ReportSyncState::Error);
        assert_eq!(failed.sync_error.as_deref(), Some("server rejected report"));

        reports
            .mark_sync_result(&created.id, ReportSyncState::Synced, None, Some(Utc::now()))
            .await
            .unwrap();
        let synced = reports.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(synced.sync_status, ReportSyncState::Synced);
        assert!(synced.sync_error.is_none());
        assert!(synced.synced_at.is_some());

        let err = reports
            .mark_sync_result("missing", ReportSyncState::Synced, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn replace_temp_references_rewrites_every_matching_report() {
        let reports = store().await;
        let temp_id = generate_temp_id();
        let temp_code = generate_temp_code();

        let first = reports
            .create(draft(vec![evaluated(&temp_id, &temp_code)]))
            .await
            .unwrap();
        let second = reports
            .create(draft(vec![
                evaluated(&temp_id, &temp_code),
                evaluated("r2", "AF-002"),
            ]))
            .await
            .unwrap();
        let untouched = reports
            .create(draft(vec![evaluated("r3", "AF-003")]))
            .await
            .unwrap();

        let rewritten = reports
            .replace_temp_references(&temp_id, "srv-9", "AF-900")
            .await
            .unwrap();
        assert_eq!(rewritten, 2);

        let first = reports.get_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(first.resources[0].resource_id, "srv-9");
        assert_eq!(first.resources[0].resource_code, "AF-900");
        let second = reports.get_by_id(&second.id).await.unwrap().unwrap();
        assert_eq!(second.resources[0].resource_id, "srv-9");
        assert_eq!(second.resources[1].resource_id, "r2");
        let untouched = reports.get_by_id(&untouched.id).await.unwrap().unwrap();
        assert_eq!(untouched.resources[0].resource_id, "r3");
    }

    #[tokio::test]
    async fn stats_and_status_listing_track_lifecycle() {
        let reports = store().await;
        let a = reports
            .create(draft(vec![evaluated("r1", "AF-001")]))
            .await
            .unwrap();
        let _b = reports
            .create(draft(vec![evaluated("r2", "AF-002")]))
            .await
            .unwrap();
        reports
            .mark_sync_result(&a.id, ReportSyncState::Synced, None, Some(Utc::now()))
            .await
            .unwrap();

        let stats = reports.stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.synced, 1);
        assert_eq!(stats.error, 0);

        let pending = reports
            .list_by_status(ReportSyncState::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_the_report() {
        let reports = store().await;
        let created = reports
            .create(draft(vec![evaluated("r1", "AF-001")]))
            .await
            .unwrap();

        reports.delete(&created.id).await.unwrap();
        assert!(reports.get_by_id(&created.id).await.unwrap().is_none());
        let err = reports.delete(&created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
