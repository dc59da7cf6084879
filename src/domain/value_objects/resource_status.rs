use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition assigned to a resource during an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Operational,
    Flagged,
    NonOperational,
    NotFound,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Operational => "operational",
            ResourceStatus::Flagged => "flagged",
            ResourceStatus::NonOperational => "non_operational",
            ResourceStatus::NotFound => "not_found",
        }
    }

    /// Statuses that require a written justification before the report may be
    /// submitted.
    pub fn requires_description(&self) -> bool {
        matches!(self, ResourceStatus::Flagged | ResourceStatus::NonOperational)
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
