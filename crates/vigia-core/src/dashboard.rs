//! Dashboard assembly — the read model behind the landing page.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::VigiaResult;
use crate::models::measurement::Measurement;
use crate::repository::{
    CategoryDeviceCount, MeasurementRepository, SeverityAlertCount, StatsRepository,
    ZoneDeviceCount,
};

/// Trailing window for the alert summary, in days.
pub const ALERT_WINDOW_DAYS: i64 = 7;

/// How many recent measurements the dashboard shows.
pub const RECENT_MEASUREMENTS: u64 = 10;

/// Everything the dashboard needs for one organization, recomputed on
/// every call.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub latest_measurements: Vec<Measurement>,
    pub devices_by_category: Vec<CategoryDeviceCount>,
    pub devices_by_zone: Vec<ZoneDeviceCount>,
    /// Alert counts over the trailing [`ALERT_WINDOW_DAYS`] window.
    pub alerts_by_severity: Vec<SeverityAlertCount>,
}

/// Assemble the dashboard for one organization.
pub async fn dashboard_summary<M, S>(
    organization_id: Uuid,
    measurements: &M,
    stats: &S,
) -> VigiaResult<DashboardSummary>
where
    M: MeasurementRepository,
    S: StatsRepository,
{
    let window_start = Utc::now() - Duration::days(ALERT_WINDOW_DAYS);

    let latest_measurements = measurements
        .latest_for_organization(organization_id, RECENT_MEASUREMENTS)
        .await?;
    let devices_by_category = stats.devices_by_category(organization_id).await?;
    let devices_by_zone = stats.devices_by_zone(organization_id).await?;
    let alerts_by_severity = stats
        .alerts_by_severity(organization_id, window_start)
        .await?;

    Ok(DashboardSummary {
        latest_measurements,
        devices_by_category,
        devices_by_zone,
        alerts_by_severity,
    })
}
