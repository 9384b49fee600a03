//! SurrealDB implementation of [`DeviceRepository`].
//!
//! This is the writing component responsible for the cross-reference
//! invariant: a device's category and zone must belong to the device's
//! own organization. Both references are resolved inside the acting
//! organization before any write; a reference that is absent or owned
//! by another tenant fails as `NotFound`.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vigia_core::error::VigiaResult;
use vigia_core::models::device::{CreateDevice, Device, DeviceStatus, UpdateDevice};
use vigia_core::repository::{DeviceRepository, PaginatedResult, Pagination};

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DeviceRow {
    organization_id: String,
    name: String,
    model: String,
    power_watts: i64,
    consumption: i64,
    status: String,
    category_id: String,
    zone_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct DeviceRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    model: String,
    power_watts: i64,
    consumption: i64,
    status: String,
    category_id: String,
    zone_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

fn parse_status(s: &str) -> Result<DeviceStatus, DbError> {
    match s {
        "active" => Ok(DeviceStatus::Active),
        "inactive" => Ok(DeviceStatus::Inactive),
        "maintenance" => Ok(DeviceStatus::Maintenance),
        other => Err(DbError::Decode(format!("unknown device status: {other}"))),
    }
}

fn status_to_str(s: DeviceStatus) -> &'static str {
    match s {
        DeviceStatus::Active => "active",
        DeviceStatus::Inactive => "inactive",
        DeviceStatus::Maintenance => "maintenance",
    }
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid UUID in {field}: {e}")))
}

impl DeviceRow {
    fn into_device(self, id: Uuid) -> Result<Device, DbError> {
        Ok(Device {
            id,
            organization_id: parse_uuid("organization_id", &self.organization_id)?,
            name: self.name,
            model: self.model,
            power_watts: self.power_watts,
            consumption: self.consumption,
            status: parse_status(&self.status)?,
            category_id: parse_uuid("category_id", &self.category_id)?,
            zone_id: parse_uuid("zone_id", &self.zone_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

impl DeviceRowWithId {
    fn try_into_device(self) -> Result<Device, DbError> {
        let id = parse_uuid("id", &self.record_id)?;
        Ok(Device {
            id,
            organization_id: parse_uuid("organization_id", &self.organization_id)?,
            name: self.name,
            model: self.model,
            power_watts: self.power_watts,
            consumption: self.consumption,
            status: parse_status(&self.status)?,
            category_id: parse_uuid("category_id", &self.category_id)?,
            zone_id: parse_uuid("zone_id", &self.zone_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Device repository.
#[derive(Clone)]
pub struct SurrealDeviceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDeviceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Ensure a referenced catalog row exists inside `organization_id`
    /// and is not soft-deleted. `table` is `category` or `zone`.
    async fn assert_owned(
        &self,
        table: &'static str,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<(), DbError> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM type::record('{table}', $id) \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE GROUP ALL"
            ))
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await?;

        let rows: Vec<CountRow> = result.take(0)?;
        let total = rows.first().map(|r| r.total).unwrap_or(0);

        if total == 0 {
            return Err(DbError::NotFound {
                entity: table.into(),
                id: id_str,
            });
        }
        Ok(())
    }
}

impl<C: Connection> DeviceRepository for SurrealDeviceRepository<C> {
    async fn create(&self, input: CreateDevice) -> VigiaResult<Device> {
        input.validate()?;

        // Resolve both references within the acting organization before
        // touching the device table.
        self.assert_owned("category", input.organization_id, input.category_id)
            .await?;
        self.assert_owned("zone", input.organization_id, input.zone_id)
            .await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let status = input.status.unwrap_or(DeviceStatus::Active);

        let result = self
            .db
            .query(
                "CREATE type::record('device', $id) SET \
                 organization_id = $organization_id, \
                 name = $name, model = $model, \
                 power_watts = $power_watts, \
                 consumption = $consumption, \
                 status = $status, \
                 category_id = $category_id, \
                 zone_id = $zone_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .bind(("model", input.model))
            .bind(("power_watts", input.power_watts))
            .bind(("consumption", input.consumption))
            .bind(("status", status_to_str(status).to_string()))
            .bind(("category_id", input.category_id.to_string()))
            .bind(("zone_id", input.zone_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("device", e))?;

        let rows: Vec<DeviceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "device".into(),
            id: id_str,
        })?;

        Ok(row.into_device(id)?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> VigiaResult<Device> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('device', $id) \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DeviceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "device".into(),
            id: id_str,
        })?;

        Ok(row.into_device(id)?)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateDevice,
    ) -> VigiaResult<Device> {
        input.validate()?;

        if let Some(category_id) = input.category_id {
            self.assert_owned("category", organization_id, category_id)
                .await?;
        }
        if let Some(zone_id) = input.zone_id {
            self.assert_owned("zone", organization_id, zone_id).await?;
        }

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.model.is_some() {
            sets.push("model = $model");
        }
        if input.power_watts.is_some() {
            sets.push("power_watts = $power_watts");
        }
        if input.consumption.is_some() {
            sets.push("consumption = $consumption");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.category_id.is_some() {
            sets.push("category_id = $category_id");
        }
        if input.zone_id.is_some() {
            sets.push("zone_id = $zone_id");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('device', $id) SET {} \
             WHERE organization_id = $organization_id \
             AND deleted_at IS NONE",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(model) = input.model {
            builder = builder.bind(("model", model));
        }
        if let Some(power_watts) = input.power_watts {
            builder = builder.bind(("power_watts", power_watts));
        }
        if let Some(consumption) = input.consumption {
            builder = builder.bind(("consumption", consumption));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_str(status).to_string()));
        }
        if let Some(category_id) = input.category_id {
            builder = builder.bind(("category_id", category_id.to_string()));
        }
        if let Some(zone_id) = input.zone_id {
            builder = builder.bind(("zone_id", zone_id.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("device", e))?;

        let rows: Vec<DeviceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "device".into(),
            id: id_str,
        })?;

        Ok(row.into_device(id)?)
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> VigiaResult<()> {
        self.db
            .query(
                "UPDATE type::record('device', $id) SET \
                 deleted_at = time::now(), updated_at = time::now() \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> VigiaResult<PaginatedResult<Device>> {
        let org_str = organization_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM device \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE GROUP ALL",
            )
            .bind(("organization_id", org_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM device \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("organization_id", org_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DeviceRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_device())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
        pagination: Pagination,
    ) -> VigiaResult<PaginatedResult<Device>> {
        let org_str = organization_id.to_string();
        let category_str = category_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM device \
                 WHERE organization_id = $organization_id \
                 AND category_id = $category_id \
                 AND deleted_at IS NONE GROUP ALL",
            )
            .bind(("organization_id", org_str.clone()))
            .bind(("category_id", category_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM device \
                 WHERE organization_id = $organization_id \
                 AND category_id = $category_id \
                 AND deleted_at IS NONE \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("organization_id", org_str))
            .bind(("category_id", category_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DeviceRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_device())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
