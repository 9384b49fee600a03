//! Measurement domain model.
//!
//! Measurements are an append-only event log: no update or delete path
//! exists. The owning organization is denormalized onto every row so
//! tenant-scoped reads never join through the device.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One periodic energy reading for a device, ordered by `timestamp`
/// descending by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub device_id: Uuid,
    /// Consumption in kWh, kept at 3-decimal precision.
    pub consumption_kwh: Decimal,
    /// When the reading was taken. Defaults to creation time but can be
    /// set explicitly when backfilling historical data.
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for appending a measurement. The tenant is inferred from the
/// referenced device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeasurement {
    pub device_id: Uuid,
    pub consumption_kwh: Decimal,
    /// `None` means "now".
    pub timestamp: Option<DateTime<Utc>>,
}
