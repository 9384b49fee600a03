//! Domain models for VIGIA.
//!
//! These are the core types shared across all crates. Everything except
//! [`user`] and [`reset_code`] belongs to exactly one organization.

pub mod alert;
pub mod category;
pub mod device;
pub mod measurement;
pub mod organization;
pub mod reset_code;
pub mod user;
pub mod zone;
