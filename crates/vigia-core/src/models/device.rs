//! Device domain model.
//!
//! A device references one category and one zone, both of which must
//! belong to the device's own organization. The store does not enforce
//! that invariant mechanically; the writing repository resolves both
//! references within the acting organization before persisting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{VigiaError, VigiaResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceStatus {
    Active,
    Inactive,
    Maintenance,
}

/// A monitored energy device. `(zone, name)` pairs are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    /// Manufacturer model string, e.g. `SP-300W`.
    pub model: String,
    /// Rated power in watts. Must be positive.
    pub power_watts: i64,
    /// Instantaneous consumption in watts. Never negative.
    pub consumption: i64,
    pub status: DeviceStatus,
    pub category_id: Uuid,
    pub zone_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields required to create a new device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDevice {
    pub organization_id: Uuid,
    pub name: String,
    pub model: String,
    pub power_watts: i64,
    pub consumption: i64,
    /// Defaults to [`DeviceStatus::Active`] when not given.
    pub status: Option<DeviceStatus>,
    pub category_id: Uuid,
    pub zone_id: Uuid,
}

impl CreateDevice {
    /// Write-time field validation. The storage schema intentionally does
    /// not duplicate these rules.
    pub fn validate(&self) -> VigiaResult<()> {
        validate_power_and_consumption(self.power_watts, self.consumption)
    }
}

/// Fields that can be updated on an existing device.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDevice {
    pub name: Option<String>,
    pub model: Option<String>,
    pub power_watts: Option<i64>,
    pub consumption: Option<i64>,
    pub status: Option<DeviceStatus>,
    pub category_id: Option<Uuid>,
    pub zone_id: Option<Uuid>,
}

impl UpdateDevice {
    pub fn validate(&self) -> VigiaResult<()> {
        if let Some(power) = self.power_watts {
            if power <= 0 {
                return Err(power_error());
            }
        }
        if let Some(consumption) = self.consumption {
            if consumption < 0 {
                return Err(consumption_error());
            }
        }
        Ok(())
    }
}

fn validate_power_and_consumption(power_watts: i64, consumption: i64) -> VigiaResult<()> {
    if power_watts <= 0 {
        return Err(power_error());
    }
    if consumption < 0 {
        return Err(consumption_error());
    }
    Ok(())
}

fn power_error() -> VigiaError {
    VigiaError::Validation {
        message: "power must be greater than zero".into(),
    }
}

fn consumption_error() -> VigiaError {
    VigiaError::Validation {
        message: "consumption cannot be negative".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(power_watts: i64, consumption: i64) -> CreateDevice {
        CreateDevice {
            organization_id: Uuid::new_v4(),
            name: "Panel".into(),
            model: "SP-300W".into(),
            power_watts,
            consumption,
            status: None,
            category_id: Uuid::new_v4(),
            zone_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn valid_fields_pass() {
        assert!(input(300, 50).validate().is_ok());
        assert!(input(1, 0).validate().is_ok());
    }

    #[test]
    fn zero_power_rejected() {
        assert!(matches!(
            input(0, 50).validate(),
            Err(VigiaError::Validation { .. })
        ));
    }

    #[test]
    fn negative_consumption_rejected() {
        assert!(matches!(
            input(300, -1).validate(),
            Err(VigiaError::Validation { .. })
        ));
    }

    #[test]
    fn partial_update_checks_only_present_fields() {
        let update = UpdateDevice {
            consumption: Some(-5),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateDevice {
            name: Some("renamed".into()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }
}
