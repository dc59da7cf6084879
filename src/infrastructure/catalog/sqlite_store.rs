use super::rows::{ClassificationRow, ResourceRow, UnitRow};
use crate::application::ports::CatalogStore;
use crate::domain::entities::{
    CatalogCounts, CatalogSnapshot, ClassificationRecord, ResourceRecord, UnitRecord,
};
use crate::domain::value_objects::Origin;
use crate::infrastructure::database::LocalStore;
use crate::shared::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use std::sync::Arc;
use tracing::debug;

const INSERT_RESOURCE: &str = r#"
INSERT INTO resources (
    id, resource_code, name, description, is_fixed_asset,
    unit_label, resource_type_label, origin, fetched_at, expires_at, creation_json
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(id) DO NOTHING
"#;

const UPSERT_OFFLINE_RESOURCE: &str = r#"
INSERT INTO resources (
    id, resource_code, name, description, is_fixed_asset,
    unit_label, resource_type_label, origin, fetched_at, expires_at, creation_json
) VALUES (?, ?, ?, ?, ?, ?, ?, 'offline', ?, ?, ?)
ON CONFLICT(id) DO UPDATE SET
    resource_code = excluded.resource_code,
    name = excluded.name,
    description = excluded.description,
    is_fixed_asset = excluded.is_fixed_asset,
    unit_label = excluded.unit_label,
    resource_type_label = excluded.resource_type_label,
    creation_json = excluded.creation_json
"#;

/// Catalog mirror over the shared local store. Backend rows are replaced
/// wholesale on refresh and filtered by expiry on read; offline rows survive
/// both.
pub struct SqliteCatalogStore {
    store: Arc<LocalStore>,
}

impl SqliteCatalogStore {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    async fn insert_resource(
        tx: &mut Transaction<'_, Sqlite>,
        record: &ResourceRecord,
    ) -> Result<()> {
        let creation_json = match &record.creation {
            Some(fields) => Some(serde_json::to_string(fields)?),
            None => None,
        };
        sqlx::query(INSERT_RESOURCE)
            .bind(&record.id)
            .bind(&record.resource_code)
            .bind(&record.name)
            .bind(&record.description)
            .bind(record.is_fixed_asset)
            .bind(&record.unit_label)
            .bind(&record.resource_type_label)
            .bind(record.origin.as_str())
            .bind(record.fetched_at.timestamp_millis())
            .bind(record.expires_at.timestamp_millis())
            .bind(creation_json)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn replace_backend_catalog(&self, snapshot: CatalogSnapshot) -> Result<()> {
        let pool = self.store.acquire().await?;
        let mut tx = pool.begin().await?;

        // Offline-origin resources survive the wipe.
        sqlx::query("DELETE FROM resources WHERE origin = 'backend'")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM units").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM classifications")
            .execute(&mut *tx)
            .await?;

        for record in &snapshot.resources {
            Self::insert_resource(&mut tx, record).await?;
        }
        for unit in &snapshot.units {
            sqlx::query(
                r#"
                INSERT INTO units (id, unit_code, name, description, fetched_at, expires_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(&unit.id)
            .bind(&unit.unit_code)
            .bind(&unit.name)
            .bind(&unit.description)
            .bind(unit.fetched_at.timestamp_millis())
            .bind(unit.expires_at.timestamp_millis())
            .execute(&mut *tx)
            .await?;
        }
        for classification in &snapshot.classifications {
            sqlx::query(
                r#"
                INSERT INTO classifications (id, name, parent_id, fetched_at, expires_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(&classification.id)
            .bind(&classification.name)
            .bind(&classification.parent_id)
            .bind(classification.fetched_at.timestamp_millis())
            .bind(classification.expires_at.timestamp_millis())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            resources = snapshot.resources.len(),
            units = snapshot.units.len(),
            classifications = snapshot.classifications.len(),
            "backend catalog replaced"
        );
        Ok(())
    }

    async fn read_resources(&self, fixed_asset: Option<bool>) -> Result<Vec<ResourceRecord>> {
        let pool = self.store.acquire().await?;
        let now = Utc::now().timestamp_millis();
        let rows: Vec<ResourceRow> = match fixed_asset {
            Some(flag) => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM resources
                    WHERE (expires_at > ? OR origin = 'offline') AND is_fixed_asset = ?
                    ORDER BY resource_code
                    "#,
                )
                .bind(now)
                .bind(flag)
                .fetch_all(&pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM resources
                    WHERE expires_at > ? OR origin = 'offline'
                    ORDER BY resource_code
                    "#,
                )
                .bind(now)
                .fetch_all(&pool)
                .await?
            }
        };
        rows.into_iter().map(ResourceRow::into_record).collect()
    }

    async fn read_units(&self) -> Result<Vec<UnitRecord>> {
        let pool = self.store.acquire().await?;
        let rows: Vec<UnitRow> =
            sqlx::query_as("SELECT * FROM units WHERE expires_at > ? ORDER BY name")
                .bind(Utc::now().timestamp_millis())
                .fetch_all(&pool)
                .await?;
        rows.into_iter().map(UnitRow::into_record).collect()
    }

    async fn read_classifications(&self) -> Result<Vec<ClassificationRecord>> {
        let pool = self.store.acquire().await?;
        let rows: Vec<ClassificationRow> =
            sqlx::query_as("SELECT * FROM classifications WHERE expires_at > ? ORDER BY name")
                .bind(Utc::now().timestamp_millis())
                .fetch_all(&pool)
                .await?;
        rows.into_iter().map(ClassificationRow::into_record).collect()
    }

    async fn read_offline_resources(&self) -> Result<Vec<ResourceRecord>> {
        let pool = self.store.acquire().await?;
        let rows: Vec<ResourceRow> =
            sqlx::query_as("SELECT * FROM resources WHERE origin = 'offline' ORDER BY fetched_at")
                .fetch_all(&pool)
                .await?;
        rows.into_iter().map(ResourceRow::into_record).collect()
    }

    async fn get_resource(&self, id: &str) -> Result<Option<ResourceRecord>> {
        let pool = self.store.acquire().await?;
        let row: Option<ResourceRow> = sqlx::query_as("SELECT * FROM resources WHERE id = ?")
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        row.map(ResourceRow::into_record).transpose()
    }

    async fn write_offline_resource(&self, record: ResourceRecord) -> Result<()> {
        if record.origin != Origin::Offline {
            return Err(AppError::ValidationError(
                "only offline-origin resources can be written directly".to_string(),
            ));
        }
        let creation_json = match &record.creation {
            Some(fields) => Some(serde_json::to_string(fields)?),
            None => None,
        };
        let pool = self.store.acquire().await?;
        sqlx::query(UPSERT_OFFLINE_RESOURCE)
            .bind(&record.id)
            .bind(&record.resource_code)
            .bind(&record.name)
            .bind(&record.description)
            .bind(record.is_fixed_asset)
            .bind(&record.unit_label)
            .bind(&record.resource_type_label)
            .bind(record.fetched_at.timestamp_millis())
            .bind(record.expires_at.timestamp_millis())
            .bind(creation_json)
            .execute(&pool)
            .await?;
        Ok(())
    }

    async fn promote_offline_resource(
        &self,
        temp_id: &str,
        real_id: &str,
        real_code: &str,
    ) -> Result<()> {
        let pool = self.store.acquire().await?;
        let mut tx = pool.begin().await?;

        // A refresh may already have mirrored the server-side record; the
        // promoted row takes its place.
        sqlx::query("DELETE FROM resources WHERE id = ?")
            .bind(real_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query(
            r#"
            UPDATE resources
            SET id = ?, resource_code = ?, origin = 'backend', creation_json = NULL
            WHERE id = ? AND origin = 'offline'
            "#,
        )
        .bind(real_id)
        .bind(real_code)
        .bind(temp_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "offline resource {temp_id} to promote"
            )));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn clear_expired_resources(&self) -> Result<u64> {
        let pool = self.store.acquire().await?;
        let removed =
            sqlx::query("DELETE FROM resources WHERE origin = 'backend' AND expires_at <= ?")
                .bind(Utc::now().timestamp_millis())
                .execute(&pool)
                .await?;
        Ok(removed.rows_affected())
    }

    async fn counts(&self) -> Result<CatalogCounts> {
        let pool = self.store.acquire().await?;
        let resources: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resources")
            .fetch_one(&pool)
            .await?;
        let units: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM units")
            .fetch_one(&pool)
            .await?;
        let classifications: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classifications")
            .fetch_one(&pool)
            .await?;
        Ok(CatalogCounts {
            resources: resources as u64,
            units: units as u64,
            classifications: classifications as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OfflineResourceFields;
    use crate::domain::value_objects::{generate_temp_code, generate_temp_id};
    use chrono::{DateTime, Duration, Utc};

    async fn store() -> SqliteCatalogStore {
        let local = Arc::new(LocalStore::in_memory());
        local.open().await.unwrap();
        SqliteCatalogStore::new(local)
    }

    fn backend_resource(id: &str, expires_at: DateTime<Utc>) -> ResourceRecord {
        ResourceRecord {
            id: id.to_string(),
            resource_code: format!("AF-{id}"),
            name: format!("resource {id}"),
            description: String::new(),
            is_fixed_asset: true,
            unit_label: Some("piece".into()),
            resource_type_label: None,
            origin: Origin::Backend,
            fetched_at: Utc::now(),
            expires_at,
            creation: None,
        }
    }

    fn offline_resource(temp_id: &str) -> ResourceRecord {
        let now = Utc::now();
        ResourceRecord {
            id: temp_id.to_string(),
            resource_code: generate_temp_code(),
            name: "field-built rig".into(),
            description: "assembled on site".into(),
            is_fixed_asset: true,
            unit_label: None,
            resource_type_label: None,
            origin: Origin::Offline,
            fetched_at: now,
            expires_at: now,
            creation: Some(OfflineResourceFields {
                unit_price: 50.0,
                classification_id: None,
                unit_id: None,
                resource_type_id: None,
                cost_type_id: None,
                is_active: true,
                is_used: true,
            }),
        }
    }

    fn snapshot(resources: Vec<ResourceRecord>) -> CatalogSnapshot {
        CatalogSnapshot {
            resources,
            units: vec![],
            classifications: vec![],
        }
    }

    #[tokio::test]
    async fn refresh_replaces_backend_rows_but_keeps_offline_rows() {
        let catalog = store().await;
        let fresh = Utc::now() + Duration::hours(24);

        let temp_ids = [generate_temp_id(), generate_temp_id()];
        for temp_id in &temp_ids {
            catalog
                .write_offline_resource(offline_resource(temp_id))
                .await
                .unwrap();
        }
        let mut before = catalog.read_offline_resources().await.unwrap();
        before.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(before.len(), 2);

        catalog
            .replace_backend_catalog(snapshot(
                (0..10).map(|n| backend_resource(&format!("old-{n}"), fresh)).collect(),
            ))
            .await
            .unwrap();

        // Second refresh with a different backend set.
        catalog
            .replace_backend_catalog(snapshot(
                (0..80).map(|n| backend_resource(&format!("new-{n}"), fresh)).collect(),
            ))
            .await
            .unwrap();

        let counts = catalog.counts().await.unwrap();
        assert_eq!(counts.resources, 82);
        assert!(catalog.get_resource("old-0").await.unwrap().is_none());

        // Both refreshes left the offline records byte-for-byte intact.
        let mut after = catalog.read_offline_resources().await.unwrap();
        after.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn reads_filter_expired_backend_rows_but_not_offline_rows() {
        let catalog = store().await;
        let expired = Utc::now() - Duration::hours(1);
        let fresh = Utc::now() + Duration::hours(24);

        let temp_id = generate_temp_id();
        catalog
            .write_offline_resource(offline_resource(&temp_id))
            .await
            .unwrap();
        catalog
            .replace_backend_catalog(snapshot(vec![
                backend_resource("stale", expired),
                backend_resource("live", fresh),
            ]))
            .await
            .unwrap();

        let visible = catalog.read_resources(None).await.unwrap();
        let ids: Vec<&str> = visible.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"live"));
        assert!(ids.contains(&temp_id.as_str()));
        assert!(!ids.contains(&"stale"));

        let removed = catalog.clear_expired_resources().await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(catalog.counts().await.unwrap().resources, 2);
    }

    #[tokio::test]
    async fn promote_rekeys_the_record_and_flips_origin() {
        let catalog = store().await;
        let temp_id = generate_temp_id();
        catalog
            .write_offline_resource(offline_resource(&temp_id))
            .await
            .unwrap();

        catalog
            .promote_offline_resource(&temp_id, "srv-1", "AF-777")
            .await
            .unwrap();

        assert!(catalog.get_resource(&temp_id).await.unwrap().is_none());
        let promoted = catalog.get_resource("srv-1").await.unwrap().unwrap();
        assert_eq!(promoted.resource_code, "AF-777");
        assert_eq!(promoted.origin, Origin::Backend);
        assert!(promoted.creation.is_none());

        let err = catalog
            .promote_offline_resource(&temp_id, "srv-2", "AF-778")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn promote_overwrites_a_mirrored_copy_of_the_real_record() {
        let catalog = store().await;
        let fresh = Utc::now() + Duration::hours(24);
        let temp_id = generate_temp_id();

        catalog
            .write_offline_resource(offline_resource(&temp_id))
            .await
            .unwrap();
        catalog
            .replace_backend_catalog(snapshot(vec![backend_resource("srv-1", fresh)]))
            .await
            .unwrap();

        catalog
            .promote_offline_resource(&temp_id, "srv-1", "AF-777")
            .await
            .unwrap();

        assert_eq!(catalog.counts().await.unwrap().resources, 1);
        let promoted = catalog.get_resource("srv-1").await.unwrap().unwrap();
        assert_eq!(promoted.name, "field-built rig");
    }

    #[tokio::test]
    async fn write_offline_resource_rejects_backend_origin() {
        let catalog = store().await;
        let record = backend_resource("a", Utc::now());
        let err = catalog.write_offline_resource(record).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn fixed_asset_filter_applies() {
        let catalog = store().await;
        let fresh = Utc::now() + Duration::hours(24);
        let mut non_asset = backend_resource("consumable", fresh);
        non_asset.is_fixed_asset = false;
        catalog
            .replace_backend_catalog(snapshot(vec![backend_resource("asset", fresh), non_asset]))
            .await
            .unwrap();

        let assets = catalog.read_resources(Some(true)).await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, "asset");
    }
}
