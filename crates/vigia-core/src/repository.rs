//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require an `organization_id` parameter on every operation after
//! creation to enforce data isolation; a row owned by another tenant is
//! reported as `NotFound`, never as a permission failure.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::VigiaResult;
use crate::models::{
    alert::{Alert, CreateAlert, Severity},
    category::{Category, CreateCategory, UpdateCategory},
    device::{CreateDevice, Device, UpdateDevice},
    measurement::{CreateMeasurement, Measurement},
    organization::{CreateOrganization, Organization, UpdateOrganization},
    reset_code::PasswordResetCode,
    user::{CreateUser, UpdateUser, User},
    zone::{CreateZone, UpdateZone, Zone},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Organizations (global scope)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = VigiaResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VigiaResult<Organization>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = VigiaResult<Organization>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = VigiaResult<Organization>> + Send;
    /// Soft-delete: stamps `deleted_at`; the row stays in storage but
    /// disappears from every read.
    fn delete(&self, id: Uuid) -> impl Future<Output = VigiaResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = VigiaResult<PaginatedResult<Organization>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped catalog
// ---------------------------------------------------------------------------

pub trait CategoryRepository: Send + Sync {
    fn create(&self, input: CreateCategory) -> impl Future<Output = VigiaResult<Category>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VigiaResult<Category>> + Send;
    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateCategory,
    ) -> impl Future<Output = VigiaResult<Category>> + Send;
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VigiaResult<()>> + Send;
    fn list(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = VigiaResult<PaginatedResult<Category>>> + Send;
}

pub trait ZoneRepository: Send + Sync {
    fn create(&self, input: CreateZone) -> impl Future<Output = VigiaResult<Zone>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VigiaResult<Zone>> + Send;
    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateZone,
    ) -> impl Future<Output = VigiaResult<Zone>> + Send;
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VigiaResult<()>> + Send;
    fn list(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = VigiaResult<PaginatedResult<Zone>>> + Send;
}

pub trait DeviceRepository: Send + Sync {
    /// Validates field rules (`power_watts > 0`, `consumption >= 0`) and
    /// resolves the referenced category and zone within the device's
    /// organization before writing. A reference owned by another tenant
    /// fails as `NotFound`.
    fn create(&self, input: CreateDevice) -> impl Future<Output = VigiaResult<Device>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VigiaResult<Device>> + Send;
    /// Same validation and reference resolution rules as [`Self::create`].
    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateDevice,
    ) -> impl Future<Output = VigiaResult<Device>> + Send;
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VigiaResult<()>> + Send;
    fn list(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = VigiaResult<PaginatedResult<Device>>> + Send;
    /// The device list's category filter.
    fn list_by_category(
        &self,
        organization_id: Uuid,
        category_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = VigiaResult<PaginatedResult<Device>>> + Send;
}

// ---------------------------------------------------------------------------
// Measurements & alerts (append-only, tenant-scoped reads)
// ---------------------------------------------------------------------------

pub trait MeasurementRepository: Send + Sync {
    /// Append a reading. The tenant is inferred from the referenced
    /// device, which must exist and not be soft-deleted. No update or
    /// delete operations exist.
    fn append(
        &self,
        input: CreateMeasurement,
    ) -> impl Future<Output = VigiaResult<Measurement>> + Send;
    fn latest_for_device(
        &self,
        organization_id: Uuid,
        device_id: Uuid,
        limit: u64,
    ) -> impl Future<Output = VigiaResult<Vec<Measurement>>> + Send;
    fn latest_for_organization(
        &self,
        organization_id: Uuid,
        limit: u64,
    ) -> impl Future<Output = VigiaResult<Vec<Measurement>>> + Send;
    /// Readings taken at or after `from`, newest first.
    fn list_since(
        &self,
        organization_id: Uuid,
        from: DateTime<Utc>,
        limit: u64,
    ) -> impl Future<Output = VigiaResult<Vec<Measurement>>> + Send;
}

pub trait AlertRepository: Send + Sync {
    /// Append an alert. The tenant is inferred from the referenced
    /// device. No update or delete operations exist.
    fn append(&self, input: CreateAlert) -> impl Future<Output = VigiaResult<Alert>> + Send;
    fn latest_for_device(
        &self,
        organization_id: Uuid,
        device_id: Uuid,
        limit: u64,
    ) -> impl Future<Output = VigiaResult<Vec<Alert>>> + Send;
    fn latest_for_organization(
        &self,
        organization_id: Uuid,
        limit: u64,
    ) -> impl Future<Output = VigiaResult<Vec<Alert>>> + Send;
    /// Alerts dated at or after `from`, newest first.
    fn list_since(
        &self,
        organization_id: Uuid,
        from: DateTime<Utc>,
        limit: u64,
    ) -> impl Future<Output = VigiaResult<Vec<Alert>>> + Send;
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Device count for one category. Categories with no devices appear with
/// a zero count.
#[derive(Debug, Clone)]
pub struct CategoryDeviceCount {
    pub category_id: Uuid,
    pub name: String,
    pub devices: u64,
}

/// Device count for one zone. Zones with no devices appear with a zero
/// count.
#[derive(Debug, Clone)]
pub struct ZoneDeviceCount {
    pub zone_id: Uuid,
    pub name: String,
    pub devices: u64,
}

/// Alert count for one severity within a trailing time window.
#[derive(Debug, Clone)]
pub struct SeverityAlertCount {
    pub severity: Severity,
    pub alerts: u64,
}

/// Read-only summaries, recomputed on every call. Implementations issue a
/// single grouped count query per aggregate rather than one count per
/// group.
pub trait StatsRepository: Send + Sync {
    fn devices_by_category(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = VigiaResult<Vec<CategoryDeviceCount>>> + Send;
    fn devices_by_zone(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = VigiaResult<Vec<ZoneDeviceCount>>> + Send;
    /// Counts alerts dated at or after `since`. Every severity is
    /// reported, zeros included.
    fn alerts_by_severity(
        &self,
        organization_id: Uuid,
        since: DateTime<Utc>,
    ) -> impl Future<Output = VigiaResult<Vec<SeverityAlertCount>>> + Send;
}

// ---------------------------------------------------------------------------
// Users & reset codes (global scope)
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Hashes the raw password before storage.
    fn create(&self, input: CreateUser) -> impl Future<Output = VigiaResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VigiaResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = VigiaResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = VigiaResult<User>> + Send;
    /// Replace the stored credential. The raw password is hashed with
    /// the same parameters [`Self::create`] uses.
    fn set_password(
        &self,
        id: Uuid,
        password: String,
    ) -> impl Future<Output = VigiaResult<()>> + Send;
}

pub trait ResetCodeRepository: Send + Sync {
    /// Persist a freshly issued code (`used = false`).
    fn create(
        &self,
        user_id: Uuid,
        code: String,
    ) -> impl Future<Output = VigiaResult<PasswordResetCode>> + Send;
    /// The most recent unused code for the user matching `code`, if any.
    /// Expiry is the caller's concern; this only filters on `used`.
    fn find_active(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> impl Future<Output = VigiaResult<Option<PasswordResetCode>>> + Send;
    /// The user's most recently issued code regardless of state.
    fn latest_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = VigiaResult<Option<PasswordResetCode>>> + Send;
    /// Mark every unused code for the user as used. Returns how many
    /// codes were swept.
    fn invalidate_all(&self, user_id: Uuid) -> impl Future<Output = VigiaResult<u64>> + Send;
    /// Consume one code: flips `used` from `false` to `true` as a
    /// conditional update. Returns `false` when the code was already
    /// used, meaning the caller lost a race and must not proceed.
    fn consume(&self, id: Uuid) -> impl Future<Output = VigiaResult<bool>> + Send;
}
