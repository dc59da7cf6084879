use crate::domain::entities::OfflineReport;
use crate::domain::value_objects::ReportSyncState;
use crate::shared::error::{AppError, Result};
use chrono::DateTime;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct ReportRow {
    pub id: String,
    pub title: String,
    pub resources_json: String,
    pub general_notes: String,
    pub author_id: String,
    pub author_name: String,
    pub created_at: i64,
    pub synced_at: Option<i64>,
    pub sync_status: String,
    pub sync_error: Option<String>,
    pub version: i64,
    pub total_resources: i64,
    pub total_images: i64,
}

impl ReportRow {
    pub fn into_report(self) -> Result<OfflineReport> {
        let created_at = DateTime::from_timestamp_millis(self.created_at)
            .ok_or_else(|| AppError::Database("invalid created_at timestamp".to_string()))?;
        let synced_at = match self.synced_at {
            Some(millis) => Some(
                DateTime::from_timestamp_millis(millis)
                    .ok_or_else(|| AppError::Database("invalid synced_at timestamp".to_string()))?,
            ),
            None => None,
        };
        Ok(OfflineReport {
            id: self.id,
            title: self.title,
            resources: serde_json::from_str(&self.resources_json)?,
            general_notes: self.general_notes,
            author_id: self.author_id,
            author_name: self.author_name,
            created_at,
            synced_at,
            sync_status: ReportSyncState::from(self.sync_status.as_str()),
            sync_error: self.sync_error,
            version: self.version,
            total_resources: self.total_resources,
            total_images: self.total_images,
        })
    }
}
