//! SurrealDB implementation of [`AlertRepository`].
//!
//! Alerts share the measurement store's append-only discipline and
//! denormalized tenant key.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vigia_core::error::VigiaResult;
use vigia_core::models::alert::{Alert, AlertStatus, AlertType, CreateAlert, Severity};
use vigia_core::repository::AlertRepository;

use crate::error::DbError;
use crate::repository::measurement::resolve_device_org;

#[derive(Debug, SurrealValue)]
struct AlertRow {
    organization_id: String,
    device_id: String,
    alert_type: String,
    severity: String,
    status: String,
    message: String,
    alert_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct AlertRowWithId {
    record_id: String,
    organization_id: String,
    device_id: String,
    alert_type: String,
    severity: String,
    status: String,
    message: String,
    alert_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

pub(crate) fn parse_severity(s: &str) -> Result<Severity, DbError> {
    match s {
        "Mediano" => Ok(Severity::Mediano),
        "Alto" => Ok(Severity::Alto),
        "Grave" => Ok(Severity::Grave),
        other => Err(DbError::Decode(format!("unknown severity: {other}"))),
    }
}

pub(crate) fn severity_to_str(s: Severity) -> &'static str {
    match s {
        Severity::Mediano => "Mediano",
        Severity::Alto => "Alto",
        Severity::Grave => "Grave",
    }
}

fn parse_alert_type(s: &str) -> Result<AlertType, DbError> {
    match s {
        "high_consumption" => Ok(AlertType::HighConsumption),
        "device_offline" => Ok(AlertType::DeviceOffline),
        "zone_limit_exceeded" => Ok(AlertType::ZoneLimitExceeded),
        other => Err(DbError::Decode(format!("unknown alert type: {other}"))),
    }
}

fn alert_type_to_str(t: AlertType) -> &'static str {
    match t {
        AlertType::HighConsumption => "high_consumption",
        AlertType::DeviceOffline => "device_offline",
        AlertType::ZoneLimitExceeded => "zone_limit_exceeded",
    }
}

fn parse_alert_status(s: &str) -> Result<AlertStatus, DbError> {
    match s {
        "active" => Ok(AlertStatus::Active),
        "resolved" => Ok(AlertStatus::Resolved),
        "dismissed" => Ok(AlertStatus::Dismissed),
        other => Err(DbError::Decode(format!("unknown alert status: {other}"))),
    }
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid UUID in {field}: {e}")))
}

impl AlertRow {
    fn into_alert(self, id: Uuid) -> Result<Alert, DbError> {
        Ok(Alert {
            id,
            organization_id: parse_uuid("organization_id", &self.organization_id)?,
            device_id: parse_uuid("device_id", &self.device_id)?,
            alert_type: parse_alert_type(&self.alert_type)?,
            severity: parse_severity(&self.severity)?,
            status: parse_alert_status(&self.status)?,
            message: self.message,
            alert_date: self.alert_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

impl AlertRowWithId {
    fn try_into_alert(self) -> Result<Alert, DbError> {
        let id = parse_uuid("id", &self.record_id)?;
        Ok(Alert {
            id,
            organization_id: parse_uuid("organization_id", &self.organization_id)?,
            device_id: parse_uuid("device_id", &self.device_id)?,
            alert_type: parse_alert_type(&self.alert_type)?,
            severity: parse_severity(&self.severity)?,
            status: parse_alert_status(&self.status)?,
            message: self.message,
            alert_date: self.alert_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

/// SurrealDB implementation of the Alert repository.
#[derive(Clone)]
pub struct SurrealAlertRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAlertRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AlertRepository for SurrealAlertRepository<C> {
    async fn append(&self, input: CreateAlert) -> VigiaResult<Alert> {
        let organization_id = resolve_device_org(&self.db, input.device_id).await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut sets = vec![
            "organization_id = $organization_id",
            "device_id = $device_id",
            "alert_type = $alert_type",
            "severity = $severity",
            "status = $status",
            "message = $message",
        ];
        if input.alert_date.is_some() {
            sets.push("alert_date = $alert_date");
        }

        let query = format!("CREATE type::record('alert', $id) SET {}", sets.join(", "));

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id))
            .bind(("device_id", input.device_id.to_string()))
            .bind(("alert_type", alert_type_to_str(input.alert_type).to_string()))
            .bind(("severity", severity_to_str(input.severity).to_string()))
            .bind(("status", "active".to_string()))
            .bind(("message", input.message));

        if let Some(alert_date) = input.alert_date {
            builder = builder.bind(("alert_date", alert_date));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::from_check("alert", e))?;

        let rows: Vec<AlertRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "alert".into(),
            id: id_str,
        })?;

        Ok(row.into_alert(id)?)
    }

    async fn latest_for_device(
        &self,
        organization_id: Uuid,
        device_id: Uuid,
        limit: u64,
    ) -> VigiaResult<Vec<Alert>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM alert \
                 WHERE organization_id = $organization_id \
                 AND device_id = $device_id \
                 AND deleted_at IS NONE \
                 ORDER BY alert_date DESC \
                 LIMIT $limit",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("device_id", device_id.to_string()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AlertRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_alert())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn latest_for_organization(
        &self,
        organization_id: Uuid,
        limit: u64,
    ) -> VigiaResult<Vec<Alert>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM alert \
                 WHERE organization_id = $organization_id \
                 AND deleted_at IS NONE \
                 ORDER BY alert_date DESC \
                 LIMIT $limit",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AlertRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_alert())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn list_since(
        &self,
        organization_id: Uuid,
        from: DateTime<Utc>,
        limit: u64,
    ) -> VigiaResult<Vec<Alert>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM alert \
                 WHERE organization_id = $organization_id \
                 AND alert_date >= $from \
                 AND deleted_at IS NONE \
                 ORDER BY alert_date DESC \
                 LIMIT $limit",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("from", from))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AlertRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_alert())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
