//! SurrealDB implementation of [`ZoneRepository`].
//!
//! `max_capacity` (kW) travels as a decimal string between the domain
//! and the row, keeping exact precision without a numeric column.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vigia_core::error::VigiaResult;
use vigia_core::models::zone::{CreateZone, UpdateZone, Zone};
use vigia_core::repository::{PaginatedResult, Pagination, ZoneRepository};

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ZoneRow {
    organization_id: String,
    name: String,
    description: Option<String>,
    location: String,
    max_capacity: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct ZoneRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    description: Option<String>,
    location: String,
    max_capacity: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, DbError> {
    raw.parse::<Decimal>()
        .map_err(|e| DbError::Decode(format!("invalid decimal in {field}: {e}")))
}

impl ZoneRow {
    fn into_zone(self, id: Uuid) -> Result<Zone, DbError> {
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| DbError::Decode(format!("invalid organization UUID: {e}")))?;
        Ok(Zone {
            id,
            organization_id,
            name: self.name,
            description: self.description,
            location: self.location,
            max_capacity: parse_decimal("max_capacity", &self.max_capacity)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

impl ZoneRowWithId {
    fn try_into_zone(self) -> Result<Zone, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| DbError::Decode(format!("invalid organization UUID: {e}")))?;
        Ok(Zone {
            id,
            organization_id,
            name: self.name,
            description: self.description,
            location: self.location,
            max_capacity: parse_decimal("max_capacity", &self.max_capacity)?,
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

/// SurrealDB implementation of the Zone repository.
#[derive(Clone)]
pub struct SurrealZoneRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealZoneRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ZoneRepository for SurrealZoneRepository<C> {
    async fn create(&self, input: CreateZone) -> VigiaResult<Zone> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('zone', $id) SET \
                 organization_id = $organization_id, \
                 name = $name, description = $description, \
                 location = $location, max_capacity = $max_capacity",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("location", input.location))
            .bind(("max_capacity", input.max_capacity.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::from_check("zone", e))?;

        let rows: Vec<ZoneRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "zone".into(),
            id: id_str,
        })?;

        Ok(row.into_zone(id)?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> VigiaResult<Zone> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('zone', $id) \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ZoneRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "zone".into(),
            id: id_str,
        })?;

        Ok(row.into_zone(id)?)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateZone,
    ) -> VigiaResult<Zone> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.location.is_some() {
            sets.push("location = $location");
        }
        if input.max_capacity.is_some() {
            sets.push("max_capacity = $max_capacity");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('zone', $id) SET {} \
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
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(location) = input.location {
            builder = builder.bind(("location", location));
        }
        if let Some(max_capacity) = input.max_capacity {
            builder = builder.bind(("max_capacity", max_capacity.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::from_check("zone", e))?;

        let rows: Vec<ZoneRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "zone".into(),
            id: id_str,
        })?;

        Ok(row.into_zone(id)?)
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> VigiaResult<()> {
        self.db
            .query(
                "UPDATE type::record('zone', $id) SET \
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
    ) -> VigiaResult<PaginatedResult<Zone>> {
        let org_str = organization_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM zone \
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
                "SELECT meta::id(id) AS record_id, * FROM zone \
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

        let rows: Vec<ZoneRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_zone())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
