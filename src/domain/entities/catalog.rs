use crate::domain::value_objects::Origin;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mirrored resource from the fixed-asset catalog.
///
/// Backend-origin records are replaced wholesale on refresh; offline-origin
/// records carry the extra creation fields needed to materialize them on the
/// server later and are never touched by a refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    pub resource_code: String,
    pub name: String,
    pub description: String,
    pub is_fixed_asset: bool,
    pub unit_label: Option<String>,
    pub resource_type_label: Option<String>,
    pub origin: Origin,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Present only for offline-created records.
    pub creation: Option<OfflineResourceFields>,
}

/// Fields captured when the user creates a resource while disconnected; they
/// feed the batched server-side creation call during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineResourceFields {
    pub unit_price: f64,
    pub classification_id: Option<String>,
    pub unit_id: Option<String>,
    pub resource_type_id: Option<String>,
    pub cost_type_id: Option<String>,
    pub is_active: bool,
    pub is_used: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: String,
    pub unit_code: String,
    pub name: String,
    pub description: String,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A classification stored flat; the hierarchy lives in `parent_id` links and
/// is reconstructed at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A classification with its children resolved, arbitrary depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationNode {
    pub record: ClassificationRecord,
    pub children: Vec<ClassificationNode>,
}

/// Rebuild the classification tree from flat `parent_id` links. Records whose
/// parent is absent from the input (or null) become roots.
pub fn build_classification_tree(records: Vec<ClassificationRecord>) -> Vec<ClassificationNode> {
    use std::collections::{HashMap, HashSet};

    let known_ids: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
    let mut by_parent: HashMap<Option<String>, Vec<ClassificationRecord>> = HashMap::new();
    for record in records {
        let key = match &record.parent_id {
            Some(parent) if known_ids.contains(parent) => Some(parent.clone()),
            _ => None,
        };
        by_parent.entry(key).or_default().push(record);
    }

    fn attach(
        parent: Option<&str>,
        by_parent: &mut std::collections::HashMap<Option<String>, Vec<ClassificationRecord>>,
    ) -> Vec<ClassificationNode> {
        let records = by_parent
            .remove(&parent.map(str::to_string))
            .unwrap_or_default();
        records
            .into_iter()
            .map(|record| {
                let children = attach(Some(record.id.as_str()), by_parent);
                ClassificationNode { record, children }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}

/// A validated, expiry-stamped batch ready to replace the backend half of the
/// mirror.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub resources: Vec<ResourceRecord>,
    pub units: Vec<UnitRecord>,
    pub classifications: Vec<ClassificationRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub resources: u64,
    pub units: u64,
    pub classifications: u64,
}

impl CatalogCounts {
    pub fn is_empty(&self) -> bool {
        self.resources == 0 && self.units == 0 && self.classifications == 0
    }
}
