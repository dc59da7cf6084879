use crate::domain::value_objects::{is_temp_code, EvidenceBlob, ReportSyncState, ResourceStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inspected resource inside a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedResource {
    pub resource_id: String,
    pub resource_code: String,
    pub resource_name: String,
    pub brand: String,
    pub status: ResourceStatus,
    pub description: String,
    #[serde(default)]
    pub evidence_urls: Vec<String>,
    #[serde(default)]
    pub evidence_blobs: Vec<EvidenceBlob>,
}

impl EvaluatedResource {
    pub fn has_temp_reference(&self) -> bool {
        is_temp_code(&self.resource_code)
    }

    pub fn evidence_count(&self) -> usize {
        self.evidence_urls.len() + self.evidence_blobs.len()
    }
}

/// A user-authored inspection report captured without network access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineReport {
    pub id: String,
    pub title: String,
    pub resources: Vec<EvaluatedResource>,
    pub general_notes: String,
    pub author_id: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
    pub sync_status: ReportSyncState,
    pub sync_error: Option<String>,
    pub version: i64,
    pub total_resources: i64,
    pub total_images: i64,
}

impl OfflineReport {
    pub fn temp_coded_resources(&self) -> Vec<&EvaluatedResource> {
        self.resources
            .iter()
            .filter(|r| r.has_temp_reference())
            .collect()
    }

    /// Submission invariants, checked locally before any network call:
    /// flagged or non-operational resources need a written justification, and
    /// every resource needs at least one piece of evidence.
    pub fn validate_for_submission(&self) -> Result<(), String> {
        for resource in &self.resources {
            if resource.status.requires_description() && resource.description.trim().is_empty() {
                return Err(format!(
                    "resource {} is {} and requires a description",
                    resource.resource_code, resource.status
                ));
            }
            if resource.evidence_count() == 0 {
                return Err(format!(
                    "resource {} has no evidence attached",
                    resource.resource_code
                ));
            }
        }
        Ok(())
    }
}

/// Input for creating a report; the store assigns id, lifecycle fields and
/// totals.
#[derive(Debug, Clone)]
pub struct OfflineReportDraft {
    pub title: String,
    pub resources: Vec<EvaluatedResource>,
    pub general_notes: String,
    pub author_id: String,
    pub author_name: String,
}

/// Partial update applied to a pending report. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct OfflineReportPatch {
    pub title: Option<String>,
    pub resources: Option<Vec<EvaluatedResource>>,
    pub general_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub total: u64,
    pub pending: u64,
    pub synced: u64,
    pub error: u64,
}

pub fn count_images(resources: &[EvaluatedResource]) -> i64 {
    resources.iter().map(|r| r.evidence_blobs.len() as i64).sum()
}
