//! SurrealDB implementation of [`MeasurementRepository`].
//!
//! Measurements are an immutable event log: the table permissions deny
//! update and delete, and this repository only ever appends and reads.
//! The owning organization is resolved from the device at append time
//! and denormalized onto the row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vigia_core::error::VigiaResult;
use vigia_core::models::measurement::{CreateMeasurement, Measurement};
use vigia_core::repository::MeasurementRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MeasurementRow {
    organization_id: String,
    device_id: String,
    consumption_kwh: String,
    timestamp: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct MeasurementRowWithId {
    record_id: String,
    organization_id: String,
    device_id: String,
    consumption_kwh: String,
    timestamp: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid UUID in {field}: {e}")))
}

fn parse_kwh(raw: &str) -> Result<Decimal, DbError> {
    raw.parse::<Decimal>()
        .map_err(|e| DbError::Decode(format!("invalid decimal in consumption_kwh: {e}")))
}

impl MeasurementRow {
    fn into_measurement(self, id: Uuid) -> Result<Measurement, DbError> {
        Ok(Measurement {
            id,
            organization_id: parse_uuid("organization_id", &self.organization_id)?,
            device_id: parse_uuid("device_id", &self.device_id)?,
            consumption_kwh: parse_kwh(&self.consumption_kwh)?,
            timestamp: self.timestamp,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

impl MeasurementRowWithId {
    fn try_into_measurement(self) -> Result<Measurement, DbError> {
        let id = parse_uuid("id", &self.record_id)?;
        Ok(Measurement {
            id,
            organization_id: parse_uuid("organization_id", &self.organization_id)?,
            device_id: parse_uuid("device_id", &self.device_id)?,
            consumption_kwh: parse_kwh(&self.consumption_kwh)?,
            timestamp: self.timestamp,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

/// Row for resolving a device's owning organization.
#[derive(Debug, SurrealValue)]
pub(crate) struct DeviceOrgRow {
    pub(crate) organization_id: String,
}

/// Look up the organization owning `device_id`. Fails with `NotFound`
/// when the device is absent or soft-deleted; the tenant of an append
/// is always inferred from a live device.
pub(crate) async fn resolve_device_org<C: Connection>(
    db: &Surreal<C>,
    device_id: Uuid,
) -> Result<String, DbError> {
    let id_str = device_id.to_string();

    let mut result = db
        .query(
            "SELECT organization_id FROM type::record('device', $id) \
             WHERE deleted_at IS NONE",
        )
        .bind(("id", id_str.clone()))
        .await?;

    let rows: Vec<DeviceOrgRow> = result.take(0)?;
    rows.into_iter()
        .next()
        .map(|r| r.organization_id)
        .ok_or(DbError::NotFound {
            entity: "device".into(),
            id: id_str,
        })
}

/// SurrealDB implementation of the Measurement repository.
#[derive(Clone)]
pub struct SurrealMeasurementRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMeasurementRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MeasurementRepository for SurrealMeasurementRepository<C> {
    async fn append(&self, input: CreateMeasurement) -> VigiaResult<Measurement> {
        let organization_id = resolve_device_org(&self.db, input.device_id).await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        // 3-decimal precision is fixed at write time.
        let kwh = input.consumption_kwh.round_dp(3);

        let mut sets = vec![
            "organization_id = $organization_id",
            "device_id = $device_id",
            "consumption_kwh = $consumption_kwh",
        ];
        if input.timestamp.is_some() {
            sets.push("timestamp = $timestamp");
        }

        let query = format!(
            "CREATE type::record('measurement', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id))
            .bind(("device_id", input.device_id.to_string()))
            .bind(("consumption_kwh", kwh.to_string()));

        if let Some(timestamp) = input.timestamp {
            builder = builder.bind(("timestamp", timestamp));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("measurement", e))?;

        let rows: Vec<MeasurementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "measurement".into(),
            id: id_str,
        })?;

        Ok(row.into_measurement(id)?)
    }

    async fn latest_for_device(
        &self,
        organization_id: Uuid,
        device_id: Uuid,
        limit: u64,
    ) -> VigiaResult<Vec<Measurement>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM measurement \
                 WHERE organization_id = $organization_id \
                 AND device_id = $device_id \
                 AND deleted_at IS NONE \
                 ORDER BY timestamp DESC \
                 LIMIT $limit",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("device_id", device_id.to_string()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MeasurementRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_measurement())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn latest_for_organization(
        &self,
        organization_id: Uuid,
        limit: u64,
    ) -> VigiaResult<Vec<Measurement>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM measurement \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE \
                 ORDER BY timestamp DESC \
                 LIMIT $limit",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MeasurementRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_measurement())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn list_since(
        &self,
        organization_id: Uuid,
        from: DateTime<Utc>,
        limit: u64,
    ) -> VigiaResult<Vec<Measurement>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM measurement \
                 WHERE organization_id = $organization_id \
                 AND timestamp >= $from \
                 AND deleted_at IS NONE \
                 ORDER BY timestamp DESC \
                 LIMIT $limit",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("from", from))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MeasurementRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_measurement())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
