//! SurrealDB implementation of [`StatsRepository`].
//!
//! Each aggregate is one grouped count query plus one catalog listing,
//! merged in memory so that groups with no matching rows still report a
//! zero count. Results are recomputed on every call; there is no
//! caching layer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vigia_core::error::VigiaResult;
use vigia_core::models::alert::Severity;
use vigia_core::repository::{
    CategoryDeviceCount, SeverityAlertCount, StatsRepository, ZoneDeviceCount,
};

use crate::error::DbError;
use crate::repository::alert::parse_severity;

/// One group of a device count, keyed by the grouping column.
#[derive(Debug, SurrealValue)]
struct DeviceGroupRow {
    group_key: String,
    total: u64,
}

/// Catalog row used to fill zero-count groups.
#[derive(Debug, SurrealValue)]
struct NamedRow {
    record_id: String,
    name: String,
}

#[derive(Debug, SurrealValue)]
struct SeverityGroupRow {
    severity: String,
    total: u64,
}

/// SurrealDB implementation of the Stats repository.
#[derive(Clone)]
pub struct SurrealStatsRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStatsRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Grouped device count over `column` (`category_id` or `zone_id`),
    /// as a map from group key to count.
    async fn device_counts(
        &self,
        organization_id: Uuid,
        column: &'static str,
    ) -> Result<HashMap<String, u64>, DbError> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {column} AS group_key, count() AS total FROM device \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE \
                 GROUP BY group_key"
            ))
            .bind(("organization_id", organization_id.to_string()))
            .await?;

        let rows: Vec<DeviceGroupRow> = result.take(0)?;
        Ok(rows.into_iter().map(|r| (r.group_key, r.total)).collect())
    }

    /// Names of all live rows in a catalog table for one organization.
    async fn catalog_names(
        &self,
        organization_id: Uuid,
        table: &'static str,
    ) -> Result<Vec<NamedRow>, DbError> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, name FROM {table} \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE \
                 ORDER BY name ASC"
            ))
            .bind(("organization_id", organization_id.to_string()))
            .await?;

        Ok(result.take(0)?)
    }
}

impl<C: Connection> StatsRepository for SurrealStatsRepository<C> {
    async fn devices_by_category(
        &self,
        organization_id: Uuid,
    ) -> VigiaResult<Vec<CategoryDeviceCount>> {
        let counts = self.device_counts(organization_id, "category_id").await?;
        let categories = self.catalog_names(organization_id, "category").await?;

        let items = categories
            .into_iter()
            .map(|row| {
                let devices = counts.get(&row.record_id).copied().unwrap_or(0);
                let category_id = Uuid::parse_str(&row.record_id)
                    .map_err(|e| DbError::Decode(format!("invalid category UUID: {e}")))?;
                Ok(CategoryDeviceCount {
                    category_id,
                    name: row.name,
                    devices,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn devices_by_zone(&self, organization_id: Uuid) -> VigiaResult<Vec<ZoneDeviceCount>> {
        let counts = self.device_counts(organization_id, "zone_id").await?;
        let zones = self.catalog_names(organization_id, "zone").await?;

        let items = zones
            .into_iter()
            .map(|row| {
                let devices = counts.get(&row.record_id).copied().unwrap_or(0);
                let zone_id = Uuid::parse_str(&row.record_id)
                    .map_err(|e| DbError::Decode(format!("invalid zone UUID: {e}")))?;
                Ok(ZoneDeviceCount {
                    zone_id,
                    name: row.name,
                    devices,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn alerts_by_severity(
        &self,
        organization_id: Uuid,
        since: DateTime<Utc>,
    ) -> VigiaResult<Vec<SeverityAlertCount>> {
        let mut result = self
            .db
            .query(
                "SELECT severity, count() AS total FROM alert \
                 WHERE organization_id = $organization_id \
                 AND alert_date >= $since \
                 AND deleted_at IS NONE \
                 GROUP BY severity",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("since", since))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SeverityGroupRow> = result.take(0).map_err(DbError::from)?;

        let mut counts: HashMap<Severity, u64> = HashMap::new();
        for row in rows {
            counts.insert(parse_severity(&row.severity)?, row.total);
        }

        // Every severity is reported, zeros included.
        let items = Severity::ALL
            .into_iter()
            .map(|severity| SeverityAlertCount {
                severity,
                alerts: counts.get(&severity).copied().unwrap_or(0),
            })
            .collect();

        Ok(items)
    }
}
