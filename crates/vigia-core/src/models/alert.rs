//! Alert domain model.
//!
//! Like measurements, alerts are append-only and carry a denormalized
//! `organization_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertType {
    HighConsumption,
    DeviceOffline,
    ZoneLimitExceeded,
}

/// Alert severity levels, ordered from least to most serious.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Mediano,
    Alto,
    Grave,
}

impl Severity {
    /// All severities, for aggregations that must report zero counts.
    pub const ALL: [Severity; 3] = [Severity::Mediano, Severity::Alto, Severity::Grave];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertStatus {
    Active,
    Resolved,
    Dismissed,
}

/// A threshold-breach notification raised against a device, ordered by
/// `alert_date` descending by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub device_id: Uuid,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub status: AlertStatus,
    pub message: String,
    /// When the alerting condition was observed. Defaults to creation
    /// time.
    pub alert_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for raising an alert. The tenant is inferred from the referenced
/// device; new alerts start in [`AlertStatus::Active`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlert {
    pub device_id: Uuid,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    /// `None` means "now".
    pub alert_date: Option<DateTime<Utc>>,
}
