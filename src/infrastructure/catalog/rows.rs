use crate::domain::entities::{ClassificationRecord, ResourceRecord, UnitRecord};
use crate::domain::value_objects::Origin;
use crate::shared::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

fn millis_to_datetime(millis: i64, column: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Database(format!("invalid timestamp in column {column}")))
}

#[derive(Debug, FromRow)]
pub struct ResourceRow {
    pub id: String,
    pub resource_code: String,
    pub name: String,
    pub description: String,
    pub is_fixed_asset: bool,
    pub unit_label: Option<String>,
    pub resource_type_label: Option<String>,
    pub origin: String,
    pub fetched_at: i64,
    pub expires_at: i64,
    pub creation_json: Option<String>,
}

impl ResourceRow {
    pub fn into_record(self) -> Result<ResourceRecord> {
        let creation = match self.creation_json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        Ok(ResourceRecord {
            id: self.id,
            resource_code: self.resource_code,
            name: self.name,
            description: self.description,
            is_fixed_asset: self.is_fixed_asset,
            unit_label: self.unit_label,
            resource_type_label: self.resource_type_label,
            origin: Origin::from(self.origin.as_str()),
            fetched_at: millis_to_datetime(self.fetched_at, "fetched_at")?,
            expires_at: millis_to_datetime(self.expires_at, "expires_at")?,
            creation,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct UnitRow {
    pub id: String,
    pub unit_code: String,
    pub name: String,
    pub description: String,
    pub fetched_at: i64,
    pub expires_at: i64,
}

impl UnitRow {
    pub fn into_record(self) -> Result<UnitRecord> {
        Ok(UnitRecord {
            id: self.id,
            unit_code: self.unit_code,
            name: self.name,
            description: self.description,
            fetched_at: millis_to_datetime(self.fetched_at, "fetched_at")?,
            expires_at: millis_to_datetime(self.expires_at, "expires_at")?,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ClassificationRow {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub fetched_at: i64,
    pub expires_at: i64,
}

impl ClassificationRow {
    pub fn into_record(self) -> Result<ClassificationRecord> {
        Ok(ClassificationRecord {
            id: self.id,
            name: self.name,
            parent_id: self.parent_id,
            fetched_at: millis_to_datetime(self.fetched_at, "fetched_at")?,
            expires_at: millis_to_datetime(self.expires_at, "expires_at")?,
        })
    }
}
