use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted lifecycle state of an offline report. `Syncing` is deliberately
/// not represented here: a report being reconciled is tracked in-memory by
/// the reconciliation engine's in-flight set and stays `Pending` (or `Error`
/// on retry) until the run settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSyncState {
    Pending,
    Synced,
    Error,
}

impl ReportSyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSyncState::Pending => "pending",
            ReportSyncState::Synced => "synced",
            ReportSyncState::Error => "error",
        }
    }

    /// Only `Synced` is terminal; an errored report is retryable forever.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportSyncState::Synced)
    }
}

impl fmt::Display for ReportSyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for ReportSyncState {
    fn from(value: &str) -> Self {
        match value {
            "synced" => ReportSyncState::Synced,
            "error" => ReportSyncState::Error,
            _ => ReportSyncState::Pending,
        }
    }
}
