//! Demo data seeding.
//!
//! Populates the store with a representative organization (categories,
//! zones, devices, two weeks of measurements, and a week of alerts)
//! through the ordinary repository API. Re-running is safe: catalog
//! rows are matched by name and the event log is only filled when
//! empty.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use tracing::info;
use vigia_core::error::{VigiaError, VigiaResult};
use vigia_core::models::alert::{AlertType, CreateAlert, Severity};
use vigia_core::models::category::{Category, CreateCategory};
use vigia_core::models::device::{CreateDevice, Device};
use vigia_core::models::measurement::CreateMeasurement;
use vigia_core::models::organization::{CreateOrganization, Organization};
use vigia_core::models::user::CreateUser;
use vigia_core::models::zone::{CreateZone, Zone};
use vigia_core::repository::{
    AlertRepository, CategoryRepository, DeviceRepository, MeasurementRepository,
    OrganizationRepository, Pagination, UserRepository, ZoneRepository,
};
use vigia_db::repository::{
    SurrealAlertRepository, SurrealCategoryRepository, SurrealDeviceRepository,
    SurrealMeasurementRepository, SurrealOrganizationRepository, SurrealUserRepository,
    SurrealZoneRepository,
};

pub const DEMO_EMAIL: &str = "demo@ecoenergy.com";

struct CategorySpec {
    name: &'static str,
    description: &'static str,
}

struct ZoneSpec {
    name: &'static str,
    location: &'static str,
    /// kW, in hundredths.
    max_capacity_centi: i64,
}

struct DeviceSpec {
    name: &'static str,
    model: &'static str,
    power_watts: i64,
    category: &'static str,
    zone: &'static str,
}

const CATEGORIES: &[CategorySpec] = &[
    CategorySpec {
        name: "Solar Panels",
        description: "Solar energy devices",
    },
    CategorySpec {
        name: "Wind Turbines",
        description: "Wind energy generators",
    },
    CategorySpec {
        name: "Battery Storage",
        description: "Energy storage systems",
    },
    CategorySpec {
        name: "Smart Meters",
        description: "Energy monitoring devices",
    },
];

const ZONES: &[ZoneSpec] = &[
    ZoneSpec {
        name: "Building A",
        location: "Main Campus",
        max_capacity_centi: 15_000,
    },
    ZoneSpec {
        name: "Building B",
        location: "North Wing",
        max_capacity_centi: 20_000,
    },
    ZoneSpec {
        name: "Parking Lot",
        location: "Outdoor Area",
        max_capacity_centi: 7_500,
    },
    ZoneSpec {
        name: "Roof Area",
        location: "Building Top",
        max_capacity_centi: 30_000,
    },
];

const DEVICES: &[DeviceSpec] = &[
    DeviceSpec {
        name: "Solar Panel Unit 1",
        model: "SP-300W",
        power_watts: 300,
        category: "Solar Panels",
        zone: "Roof Area",
    },
    DeviceSpec {
        name: "Solar Panel Unit 2",
        model: "SP-300W",
        power_watts: 300,
        category: "Solar Panels",
        zone: "Roof Area",
    },
    DeviceSpec {
        name: "Wind Generator A",
        model: "WG-5KW",
        power_watts: 5000,
        category: "Wind Turbines",
        zone: "Parking Lot",
    },
    DeviceSpec {
        name: "Battery Pack 1",
        model: "BP-100",
        power_watts: 1000,
        category: "Battery Storage",
        zone: "Building A",
    },
    DeviceSpec {
        name: "Smart Meter Main",
        model: "SM-Advanced",
        power_watts: 50,
        category: "Smart Meters",
        zone: "Building A",
    },
    DeviceSpec {
        name: "Smart Meter B-Wing",
        model: "SM-Standard",
        power_watts: 50,
        category: "Smart Meters",
        zone: "Building B",
    },
    DeviceSpec {
        name: "Solar Panel Unit 3",
        model: "SP-400W",
        power_watts: 400,
        category: "Solar Panels",
        zone: "Roof Area",
    },
    DeviceSpec {
        name: "Battery Pack 2",
        model: "BP-150",
        power_watts: 1500,
        category: "Battery Storage",
        zone: "Building B",
    },
];

/// Seed the demo tenant and return it.
pub async fn run<C: Connection>(db: &Surreal<C>) -> VigiaResult<Organization> {
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let user_repo = SurrealUserRepository::new(db.clone());
    let category_repo = SurrealCategoryRepository::new(db.clone());
    let zone_repo = SurrealZoneRepository::new(db.clone());
    let device_repo = SurrealDeviceRepository::new(db.clone());
    let measurement_repo = SurrealMeasurementRepository::new(db.clone());
    let alert_repo = SurrealAlertRepository::new(db.clone());

    // Demo account and organization.
    match user_repo.get_by_email(DEMO_EMAIL).await {
        Ok(_) => {}
        Err(VigiaError::NotFound { .. }) => {
            user_repo
                .create(CreateUser {
                    email: DEMO_EMAIL.into(),
                    display_name: "Demo User".into(),
                    password: "demo-password".into(),
                })
                .await?;
        }
        Err(e) => return Err(e),
    }

    let org = match org_repo.get_by_email(DEMO_EMAIL).await {
        Ok(org) => org,
        Err(VigiaError::NotFound { .. }) => {
            org_repo
                .create(CreateOrganization {
                    name: "EcoEnergy Demo Company".into(),
                    email: DEMO_EMAIL.into(),
                })
                .await?
        }
        Err(e) => return Err(e),
    };
    info!(organization = %org.name, "Seeding demo tenant");

    let categories = seed_categories(&category_repo, &org).await?;
    let zones = seed_zones(&zone_repo, &org).await?;
    let devices = seed_devices(&device_repo, &org, &categories, &zones).await?;

    // Only fill the event log once.
    let existing = measurement_repo
        .latest_for_organization(org.id, 1)
        .await?;
    if existing.is_empty() {
        seed_measurements(&measurement_repo, &devices).await?;
        seed_alerts(&alert_repo, &devices).await?;
    }

    Ok(org)
}

async fn seed_categories<R: CategoryRepository>(
    repo: &R,
    org: &Organization,
) -> VigiaResult<HashMap<String, Category>> {
    let page = Pagination {
        offset: 0,
        limit: 100,
    };
    let mut by_name: HashMap<String, Category> = repo
        .list(org.id, page)
        .await?
        .items
        .into_iter()
        .map(|c| (c.name.clone(), c))
        .collect();

    for spec in CATEGORIES {
        if !by_name.contains_key(spec.name) {
            let created = repo
                .create(CreateCategory {
                    organization_id: org.id,
                    name: spec.name.into(),
                    description: Some(spec.description.into()),
                })
                .await?;
            info!(category = %created.name, "Seeded category");
            by_name.insert(created.name.clone(), created);
        }
    }

    Ok(by_name)
}

async fn seed_zones<R: ZoneRepository>(
    repo: &R,
    org: &Organization,
) -> VigiaResult<HashMap<String, Zone>> {
    let page = Pagination {
        offset: 0,
        limit: 100,
    };
    let mut by_name: HashMap<String, Zone> = repo
        .list(org.id, page)
        .await?
        .items
        .into_iter()
        .map(|z| (z.name.clone(), z))
        .collect();

    for spec in ZONES {
        if !by_name.contains_key(spec.name) {
            let created = repo
                .create(CreateZone {
                    organization_id: org.id,
                    name: spec.name.into(),
                    description: Some(format!("Zone located at {}", spec.location)),
                    location: spec.location.into(),
                    max_capacity: Decimal::new(spec.max_capacity_centi, 2),
                })
                .await?;
            info!(zone = %created.name, "Seeded zone");
            by_name.insert(created.name.clone(), created);
        }
    }

    Ok(by_name)
}

async fn seed_devices<R: DeviceRepository>(
    repo: &R,
    org: &Organization,
    categories: &HashMap<String, Category>,
    zones: &HashMap<String, Zone>,
) -> VigiaResult<Vec<Device>> {
    let page = Pagination {
        offset: 0,
        limit: 100,
    };
    let mut by_name: HashMap<String, Device> = repo
        .list(org.id, page)
        .await?
        .items
        .into_iter()
        .map(|d| (d.name.clone(), d))
        .collect();

    // Keep DEVICES order; the alert seed refers to devices by index.
    let mut devices = Vec::with_capacity(DEVICES.len());
    let mut rng = rand::rng();
    for spec in DEVICES {
        if let Some(existing) = by_name.get(spec.name) {
            devices.push(existing.clone());
            continue;
        }
        let category = categories
            .get(spec.category)
            .ok_or_else(|| VigiaError::Internal(format!("missing category {}", spec.category)))?;
        let zone = zones
            .get(spec.zone)
            .ok_or_else(|| VigiaError::Internal(format!("missing zone {}", spec.zone)))?;

        let created = repo
            .create(CreateDevice {
                organization_id: org.id,
                name: spec.name.into(),
                model: spec.model.into(),
                power_watts: spec.power_watts,
                consumption: rng.random_range(50..=spec.power_watts),
                status: None,
                category_id: category.id,
                zone_id: zone.id,
            })
            .await?;
        info!(device = %created.name, "Seeded device");
        by_name.insert(created.name.clone(), created.clone());
        devices.push(created);
    }

    Ok(devices)
}

/// Two weeks of readings per device, one every 2-6 hours.
async fn seed_measurements<R: MeasurementRepository>(
    repo: &R,
    devices: &[Device],
) -> VigiaResult<()> {
    let now = Utc::now();
    let mut rng = rand::rng();
    let mut total = 0u32;

    for device in devices {
        let mut current = now - Duration::days(14);
        while current <= now {
            // Between 0.500 and 15.000 kWh.
            let kwh = Decimal::new(rng.random_range(500..15_000), 3);
            repo.append(CreateMeasurement {
                device_id: device.id,
                consumption_kwh: kwh,
                timestamp: Some(current),
            })
            .await?;
            total += 1;
            current += Duration::hours(rng.random_range(2..=6));
        }
    }

    info!(devices = devices.len(), measurements = total, "Seeded measurements");
    Ok(())
}

/// A week of representative alerts.
async fn seed_alerts<R: AlertRepository>(repo: &R, devices: &[Device]) -> VigiaResult<()> {
    let alerts: &[(usize, AlertType, Severity, &str)] = &[
        (
            0,
            AlertType::HighConsumption,
            Severity::Grave,
            "Critical: Solar Panel Unit 1 consuming excessive energy",
        ),
        (
            2,
            AlertType::DeviceOffline,
            Severity::Alto,
            "Wind Generator A is offline",
        ),
        (
            1,
            AlertType::HighConsumption,
            Severity::Mediano,
            "Solar Panel Unit 2 consumption above normal",
        ),
        (
            3,
            AlertType::ZoneLimitExceeded,
            Severity::Alto,
            "Battery Pack 1 zone limit exceeded",
        ),
        (
            4,
            AlertType::HighConsumption,
            Severity::Mediano,
            "Smart Meter showing irregular readings",
        ),
        (
            6,
            AlertType::HighConsumption,
            Severity::Grave,
            "Solar Panel Unit 3 critical consumption detected",
        ),
    ];

    let week_ago = Utc::now() - Duration::days(7);
    let mut rng = rand::rng();

    for (index, alert_type, severity, message) in alerts {
        let Some(device) = devices.get(*index) else {
            continue;
        };
        let date =
            week_ago + Duration::days(rng.random_range(0..7)) + Duration::hours(rng.random_range(0..24));
        repo.append(CreateAlert {
            device_id: device.id,
            alert_type: *alert_type,
            severity: *severity,
            message: (*message).into(),
            alert_date: Some(date),
        })
        .await?;
    }

    info!(alerts = alerts.len(), "Seeded alerts");
    Ok(())
}
