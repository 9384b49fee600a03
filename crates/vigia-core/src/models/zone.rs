//! Zone domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical area of a site (a building, a roof, a parking lot) with an
/// energy ceiling it should not exceed. Owned by one organization; names
/// are unique per organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Free-text location, e.g. `North Wing`.
    pub location: String,
    /// Maximum capacity in kW.
    pub max_capacity: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields required to create a new zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateZone {
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub max_capacity: Decimal,
}

/// Fields that can be updated on an existing zone.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateZone {
    pub name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub description: Option<Option<String>>,
    pub location: Option<String>,
    pub max_capacity: Option<Decimal>,
}
