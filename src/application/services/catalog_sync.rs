use crate::application::ports::{
    CatalogStore, RemoteApi, RemoteClassification, RemoteResource, RemoteUnit,
};
use crate::domain::entities::{CatalogSnapshot, ClassificationRecord, ResourceRecord, UnitRecord};
use crate::domain::value_objects::Origin;
use crate::shared::config::SyncConfig;
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one full catalog refresh, reported to the caller for
/// diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub resources_stored: usize,
    pub units_stored: usize,
    pub classifications_stored: usize,
    /// Records dropped at the mapping seam for missing identifiers.
    pub dropped_records: usize,
}

struct FetchedCatalogs {
    resources: Vec<RemoteResource>,
    units: Vec<RemoteUnit>,
    classifications: Vec<RemoteClassification>,
}

/// Sequential fetch → validate → persist → verify pipeline that replaces the
/// backend half of the catalog mirror. Deciding *when* to run it is the
/// auto-sync scheduler's job.
pub struct CatalogSyncPipeline {
    remote: Arc<dyn RemoteApi>,
    catalog: Arc<dyn CatalogStore>,
    policy: SyncConfig,
}

impl CatalogSyncPipeline {
    pub fn new(remote: Arc<dyn RemoteApi>, catalog: Arc<dyn CatalogStore>, policy: SyncConfig) -> Self {
        Self {
            remote,
            catalog,
            policy,
        }
    }

    pub async fn run(&self) -> Result<RefreshOutcome> {
        let fetched = self.fetch().await?;
        let now = Utc::now();
        let (snapshot, dropped) = self.validate(fetched, now);

        let outcome = RefreshOutcome {
            resources_stored: snapshot.resources.len(),
            units_stored: snapshot.units.len(),
            classifications_stored: snapshot.classifications.len(),
            dropped_records: dropped,
        };

        self.catalog.replace_backend_catalog(snapshot).await?;

        // Read-after-write check; the refresh settles before callers see it.
        let counts = self.catalog.counts().await?;
        info!(
            resources = counts.resources,
            units = counts.units,
            classifications = counts.classifications,
            dropped,
            "catalog refresh persisted"
        );

        Ok(outcome)
    }

    async fn fetch(&self) -> Result<FetchedCatalogs> {
        let resources = self.remote.fetch_all_resources(true).await?;
        let units = self.remote.fetch_all_units().await?;
        let classifications = self.remote.fetch_all_classifications().await?;
        debug!(
            resources = resources.len(),
            units = units.len(),
            classifications = classifications.len(),
            "catalogs fetched"
        );
        Ok(FetchedCatalogs {
            resources,
            units,
            classifications,
        })
    }

    fn validate(&self, fetched: FetchedCatalogs, now: DateTime<Utc>) -> (CatalogSnapshot, usize) {
        let mut dropped = 0usize;

        let resource_expiry = now + self.policy.resource_ttl();
        let reference_expiry = now + self.policy.reference_ttl();

        let mut resources = Vec::with_capacity(fetched.resources.len());
        for remote in fetched.resources {
            match map_resource(remote, now, resource_expiry) {
                Some(record) => resources.push(record),
                None => dropped += 1,
            }
        }

        let mut units = Vec::with_capacity(fetched.units.len());
        for remote in fetched.units {
            match map_unit(remote, now, reference_expiry) {
                Some(record) => units.push(record),
                None => dropped += 1,
            }
        }

        let mut classifications = Vec::new();
        for remote in fetched.classifications {
            flatten_classification(remote, now, reference_expiry, &mut classifications, &mut dropped);
        }

        if dropped > 0 {
            warn!(dropped, "dropped catalog records missing identifiers");
        }

        (
            CatalogSnapshot {
                resources,
                units,
                classifications,
            },
            dropped,
        )
    }
}

fn valid_id(id: Option<String>) -> Option<String> {
    id.filter(|value| !value.trim().is_empty())
}

fn map_resource(
    remote: RemoteResource,
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Option<ResourceRecord> {
    let id = valid_id(remote.id)?;
    Some(ResourceRecord {
        id,
        resource_code: remote.resource_code.unwrap_or_default(),
        name: remote.name.unwrap_or_default(),
        description: remote.description.unwrap_or_default(),
        is_fixed_asset: remote.is_fixed_asset.unwrap_or(false),
        unit_label: remote.unit.map(|u| u.name),
        resource_type_label: remote.resource_type.map(|t| t.name),
        origin: Origin::Backend,
        fetched_at: now,
        expires_at,
        creation: None,
    })
}

fn map_unit(remote: RemoteUnit, now: DateTime<Utc>, expires_at: DateTime<Utc>) -> Option<UnitRecord> {
    let id = valid_id(remote.id)?;
    Some(UnitRecord {
        id,
        unit_code: remote.unit_code.unwrap_or_default(),
        name: remote.name.unwrap_or_default(),
        description: remote.description.unwrap_or_default(),
        fetched_at: now,
        expires_at,
    })
}

/// Walk the nested `childs` arrays and emit flat parent-linked records.
fn flatten_classification(
    remote: RemoteClassification,
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    out: &mut Vec<ClassificationRecord>,
    dropped: &mut usize,
) {
    match valid_id(remote.id) {
        Some(id) => out.push(ClassificationRecord {
            id,
            name: remote.name.unwrap_or_default(),
            parent_id: remote.parent_id.filter(|p| !p.trim().is_empty()),
            fetched_at: now,
            expires_at,
        }),
        None => *dropped += 1,
    }
    for child in remote.childs {
        flatten_classification(child, now, expires_at, out, dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::RemoteLabel;

    fn remote_classification(
        id: Option<&str>,
        parent: Option<&str>,
        childs: Vec<RemoteClassification>,
    ) -> RemoteClassification {
        RemoteClassification {
            id: id.map(str::to_string),
            name: Some("machines".into()),
            parent_id: parent.map(str::to_string),
            childs,
        }
    }

    #[test]
    fn nested_classifications_are_flattened_depth_first() {
        let now = Utc::now();
        let expires = now + chrono::Duration::days(30);
        let tree = remote_classification(
            Some("a"),
            None,
            vec![remote_classification(
                Some("b"),
                Some("a"),
                vec![remote_classification(Some("c"), Some("b"), vec![])],
            )],
        );

        let mut out = Vec::new();
        let mut dropped = 0;
        flatten_classification(tree, now, expires, &mut out, &mut dropped);

        assert_eq!(dropped, 0);
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(out[1].parent_id.as_deref(), Some("a"));
    }

    #[test]
    fn records_without_ids_are_dropped_but_children_kept() {
        let now = Utc::now();
        let expires = now + chrono::Duration::days(30);
        let tree = remote_classification(
            None,
            None,
            vec![remote_classification(Some("kept"), None, vec![])],
        );

        let mut out = Vec::new();
        let mut dropped = 0;
        flatten_classification(tree, now, expires, &mut out, &mut dropped);

        assert_eq!(dropped, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "kept");
    }

    #[test]
    fn resource_mapping_rejects_blank_ids() {
        let now = Utc::now();
        let expires = now + chrono::Duration::hours(24);
        assert!(map_resource(RemoteResource::default(), now, expires).is_none());
        assert!(map_resource(
            RemoteResource {
                id: Some("   ".into()),
                ..Default::default()
            },
            now,
            expires
        )
        .is_none());

        let mapped = map_resource(
            RemoteResource {
                id: Some("res-1".into()),
                resource_code: Some("AF-001".into()),
                is_fixed_asset: Some(true),
                unit: Some(RemoteLabel { name: "unit".into() }),
                ..Default::default()
            },
            now,
            expires,
        )
        .unwrap();
        assert_eq!(mapped.origin, Origin::Backend);
        assert!(mapped.is_fixed_asset);
        assert_eq!(mapped.unit_label.as_deref(), Some("unit"));
        assert!(mapped.expires_at > mapped.fetched_at);
    }
}
