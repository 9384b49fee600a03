//! Integration tests for the append-only measurement and alert stores
//! and the aggregation queries.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;
use vigia_core::dashboard::dashboard_summary;
use vigia_core::error::VigiaError;
use vigia_core::models::alert::{AlertStatus, AlertType, CreateAlert, Severity};
use vigia_core::models::category::CreateCategory;
use vigia_core::models::device::CreateDevice;
use vigia_core::models::measurement::CreateMeasurement;
use vigia_core::models::organization::CreateOrganization;
use vigia_core::models::zone::CreateZone;
use vigia_core::repository::{
    AlertRepository, CategoryRepository, DeviceRepository, MeasurementRepository,
    OrganizationRepository, StatsRepository, ZoneRepository,
};
use vigia_db::repository::{
    SurrealAlertRepository, SurrealCategoryRepository, SurrealDeviceRepository,
    SurrealMeasurementRepository, SurrealOrganizationRepository, SurrealStatsRepository,
    SurrealZoneRepository,
};

type Db = surrealdb::engine::local::Db;

struct Fixture {
    db: Surreal<Db>,
    org_id: Uuid,
    device_id: Uuid,
}

/// One organization with one device, ready for telemetry.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vigia_db::run_migrations(&db).await.unwrap();

    let (org_id, device_id) = seed_tenant(&db, "Acme", "acme@x.com").await;
    Fixture {
        db,
        org_id,
        device_id,
    }
}

/// Create an organization with a category, a zone, and one device.
async fn seed_tenant(db: &Surreal<Db>, name: &str, email: &str) -> (Uuid, Uuid) {
    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: name.into(),
            email: email.into(),
        })
        .await
        .unwrap();

    let category = SurrealCategoryRepository::new(db.clone())
        .create(CreateCategory {
            organization_id: org.id,
            name: "Solar".into(),
            description: None,
        })
        .await
        .unwrap();

    let zone = SurrealZoneRepository::new(db.clone())
        .create(CreateZone {
            organization_id: org.id,
            name: "Roof".into(),
            description: None,
            location: "Building Top".into(),
            max_capacity: Decimal::new(30_000, 2),
        })
        .await
        .unwrap();

    let device = SurrealDeviceRepository::new(db.clone())
        .create(CreateDevice {
            organization_id: org.id,
            name: "Panel1".into(),
            model: "SP-300W".into(),
            power_watts: 300,
            consumption: 50,
            status: None,
            category_id: category.id,
            zone_id: zone.id,
        })
        .await
        .unwrap();

    (org.id, device.id)
}

// -----------------------------------------------------------------------
// Measurements
// -----------------------------------------------------------------------

#[tokio::test]
async fn append_measurement_infers_tenant_and_rounds() {
    let f = setup().await;
    let repo = SurrealMeasurementRepository::new(f.db.clone());

    let measurement = repo
        .append(CreateMeasurement {
            device_id: f.device_id,
            consumption_kwh: "12.34567".parse().unwrap(),
            timestamp: None,
        })
        .await
        .unwrap();

    assert_eq!(measurement.organization_id, f.org_id);
    // 3-decimal precision fixed at write time.
    assert_eq!(measurement.consumption_kwh, Decimal::new(12_346, 3));
}

#[tokio::test]
async fn append_for_unknown_device_fails() {
    let f = setup().await;
    let repo = SurrealMeasurementRepository::new(f.db.clone());

    let result = repo
        .append(CreateMeasurement {
            device_id: Uuid::new_v4(),
            consumption_kwh: Decimal::new(1_000, 3),
            timestamp: None,
        })
        .await;

    assert!(matches!(result, Err(VigiaError::NotFound { .. })));
}

#[tokio::test]
async fn measurements_ordered_newest_first_with_backfill() {
    let f = setup().await;
    let repo = SurrealMeasurementRepository::new(f.db.clone());
    let now = Utc::now();

    for days_ago in [3, 1, 2] {
        repo.append(CreateMeasurement {
            device_id: f.device_id,
            consumption_kwh: Decimal::new(days_ago * 1000, 3),
            timestamp: Some(now - Duration::days(days_ago)),
        })
        .await
        .unwrap();
    }

    let latest = repo
        .latest_for_device(f.org_id, f.device_id, 10)
        .await
        .unwrap();
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0].consumption_kwh, Decimal::new(1_000, 3));
    assert_eq!(latest[2].consumption_kwh, Decimal::new(3_000, 3));

    let recent = repo
        .list_since(f.org_id, now - Duration::days(2) - Duration::hours(1), 10)
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
}

#[tokio::test]
async fn measurement_reads_are_tenant_isolated() {
    let f = setup().await;
    let repo = SurrealMeasurementRepository::new(f.db.clone());

    let (other_org, other_device) = seed_tenant(&f.db, "Globex", "globex@x.com").await;

    repo.append(CreateMeasurement {
        device_id: f.device_id,
        consumption_kwh: Decimal::new(1_500, 3),
        timestamp: None,
    })
    .await
    .unwrap();
    repo.append(CreateMeasurement {
        device_id: other_device,
        consumption_kwh: Decimal::new(9_999, 3),
        timestamp: None,
    })
    .await
    .unwrap();

    let acme = repo.latest_for_organization(f.org_id, 50).await.unwrap();
    assert_eq!(acme.len(), 1);
    assert_eq!(acme[0].device_id, f.device_id);

    let globex = repo.latest_for_organization(other_org, 50).await.unwrap();
    assert_eq!(globex.len(), 1);
    assert_eq!(globex[0].device_id, other_device);

    // Reading the other tenant's device through the wrong org yields
    // nothing.
    let crossed = repo
        .latest_for_device(f.org_id, other_device, 50)
        .await
        .unwrap();
    assert!(crossed.is_empty());
}

// -----------------------------------------------------------------------
// Alerts
// -----------------------------------------------------------------------

#[tokio::test]
async fn append_alert_starts_active() {
    let f = setup().await;
    let repo = SurrealAlertRepository::new(f.db.clone());

    let alert = repo
        .append(CreateAlert {
            device_id: f.device_id,
            alert_type: AlertType::HighConsumption,
            severity: Severity::Alto,
            message: "Panel1 consumption above normal".into(),
            alert_date: None,
        })
        .await
        .unwrap();

    assert_eq!(alert.status, AlertStatus::Active);
    assert_eq!(alert.organization_id, f.org_id);
    assert_eq!(alert.severity, Severity::Alto);
}

#[tokio::test]
async fn alert_reads_are_tenant_isolated() {
    let f = setup().await;
    let repo = SurrealAlertRepository::new(f.db.clone());

    let (other_org, other_device) = seed_tenant(&f.db, "Globex", "globex@x.com").await;

    repo.append(CreateAlert {
        device_id: other_device,
        alert_type: AlertType::DeviceOffline,
        severity: Severity::Grave,
        message: "foreign device offline".into(),
        alert_date: None,
    })
    .await
    .unwrap();

    assert!(
        repo.latest_for_organization(f.org_id, 50)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        repo.latest_for_organization(other_org, 50)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn alerts_by_severity_respects_window() {
    let f = setup().await;
    let repo = SurrealAlertRepository::new(f.db.clone());
    let stats = SurrealStatsRepository::new(f.db.clone());
    let now = Utc::now();

    // One Grave alert inside the 7-day window, one outside it.
    for days_ago in [2, 10] {
        repo.append(CreateAlert {
            device_id: f.device_id,
            alert_type: AlertType::HighConsumption,
            severity: Severity::Grave,
            message: format!("critical, {days_ago} days ago"),
            alert_date: Some(now - Duration::days(days_ago)),
        })
        .await
        .unwrap();
    }

    let counts = stats
        .alerts_by_severity(f.org_id, now - Duration::days(7))
        .await
        .unwrap();

    // Every severity reported, zeros included.
    assert_eq!(counts.len(), 3);
    for count in &counts {
        let expected = if count.severity == Severity::Grave { 1 } else { 0 };
        assert_eq!(count.alerts, expected, "severity {:?}", count.severity);
    }
}

// -----------------------------------------------------------------------
// Stats & dashboard
// -----------------------------------------------------------------------

#[tokio::test]
async fn device_counts_by_zone_include_empty_zones() {
    let f = setup().await;
    let zone_repo = SurrealZoneRepository::new(f.db.clone());
    let stats = SurrealStatsRepository::new(f.db.clone());

    zone_repo
        .create(CreateZone {
            organization_id: f.org_id,
            name: "Annex".into(),
            description: None,
            location: "East Side".into(),
            max_capacity: Decimal::new(5_000, 2),
        })
        .await
        .unwrap();

    let counts = stats.devices_by_zone(f.org_id).await.unwrap();
    assert_eq!(counts.len(), 2);

    let annex = counts.iter().find(|c| c.name == "Annex").unwrap();
    assert_eq!(annex.devices, 0);
    let roof = counts.iter().find(|c| c.name == "Roof").unwrap();
    assert_eq!(roof.devices, 1);
}

#[tokio::test]
async fn stats_are_tenant_scoped() {
    let f = setup().await;
    let stats = SurrealStatsRepository::new(f.db.clone());

    // A second tenant with its own device must not leak into Acme's
    // numbers.
    let (other_org, _) = seed_tenant(&f.db, "Globex", "globex@x.com").await;

    let acme = stats.devices_by_category(f.org_id).await.unwrap();
    assert_eq!(acme.len(), 1);
    assert_eq!(acme[0].devices, 1);

    let globex = stats.devices_by_category(other_org).await.unwrap();
    assert_eq!(globex.len(), 1);
    assert_eq!(globex[0].devices, 1);
}

#[tokio::test]
async fn dashboard_summary_assembles_all_sections() {
    let f = setup().await;
    let measurement_repo = SurrealMeasurementRepository::new(f.db.clone());
    let alert_repo = SurrealAlertRepository::new(f.db.clone());
    let stats = SurrealStatsRepository::new(f.db.clone());

    for i in 0..12 {
        measurement_repo
            .append(CreateMeasurement {
                device_id: f.device_id,
                consumption_kwh: Decimal::new(1_000 + i, 3),
                timestamp: Some(Utc::now() - Duration::hours(i)),
            })
            .await
            .unwrap();
    }
    alert_repo
        .append(CreateAlert {
            device_id: f.device_id,
            alert_type: AlertType::ZoneLimitExceeded,
            severity: Severity::Mediano,
            message: "Roof zone limit exceeded".into(),
            alert_date: None,
        })
        .await
        .unwrap();

    let summary = dashboard_summary(f.org_id, &measurement_repo, &stats)
        .await
        .unwrap();

    // Capped at the ten most recent readings.
    assert_eq!(summary.latest_measurements.len(), 10);
    assert_eq!(summary.latest_measurements[0].consumption_kwh, Decimal::new(1_000, 3));
    assert_eq!(summary.devices_by_category.len(), 1);
    assert_eq!(summary.devices_by_zone.len(), 1);

    let mediano = summary
        .alerts_by_severity
        .iter()
        .find(|c| c.severity == Severity::Mediano)
        .unwrap();
    assert_eq!(mediano.alerts, 1);
}
