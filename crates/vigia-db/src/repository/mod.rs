//! SurrealDB repository implementations.

mod alert;
mod category;
mod device;
mod measurement;
mod organization;
mod reset_code;
mod stats;
mod user;
mod zone;

pub use alert::SurrealAlertRepository;
pub use category::SurrealCategoryRepository;
pub use device::SurrealDeviceRepository;
pub use measurement::SurrealMeasurementRepository;
pub use organization::SurrealOrganizationRepository;
pub use reset_code::SurrealResetCodeRepository;
pub use stats::SurrealStatsRepository;
pub use user::SurrealUserRepository;
pub use zone::SurrealZoneRepository;
