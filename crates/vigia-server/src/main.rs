//! VIGIA Server — application entry point.
//!
//! Connects to SurrealDB, applies migrations, seeds the demo tenant,
//! and logs the dashboard summary. The HTTP surface consumes the same
//! repositories; this binary is an ordinary caller of them.

use tracing_subscriber::EnvFilter;
use vigia_auth::{AuthConfig, AuthService, TracingMailer};
use vigia_core::dashboard::dashboard_summary;
use vigia_db::repository::{
    SurrealMeasurementRepository, SurrealResetCodeRepository, SurrealStatsRepository,
    SurrealUserRepository,
};
use vigia_db::{DbConfig, DbManager};

mod seed;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vigia=info".parse().unwrap()))
        .json()
        .init();

    tracing::info!("Starting VIGIA server...");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "VIGIA server failed");
        std::process::exit(1);
    }

    tracing::info!("VIGIA server stopped.");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DbConfig::from_env();
    let manager = DbManager::connect(&config).await?;
    let db = manager.client().clone();

    vigia_db::run_migrations(&db).await?;

    let org = seed::run(&db).await?;

    // Dashboard summary for the seeded tenant.
    let measurement_repo = SurrealMeasurementRepository::new(db.clone());
    let stats_repo = SurrealStatsRepository::new(db.clone());
    let summary = dashboard_summary(org.id, &measurement_repo, &stats_repo).await?;

    for count in &summary.devices_by_category {
        tracing::info!(category = %count.name, devices = count.devices, "Devices by category");
    }
    for count in &summary.devices_by_zone {
        tracing::info!(zone = %count.name, devices = count.devices, "Devices by zone");
    }
    for count in &summary.alerts_by_severity {
        tracing::info!(severity = ?count.severity, alerts = count.alerts, "Alerts this week");
    }
    tracing::info!(
        measurements = summary.latest_measurements.len(),
        "Recent measurements loaded"
    );

    // Walk the reset flow far enough to show the mail going out.
    let auth = AuthService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealResetCodeRepository::new(db.clone()),
        TracingMailer,
        AuthConfig::default(),
    );
    auth.request_reset(seed::DEMO_EMAIL).await?;
    tracing::info!(email = seed::DEMO_EMAIL, "Demo reset code issued");

    Ok(())
}
