//! VIGIA Core — domain models, repository traits, and error types.
//!
//! This crate is persistence-agnostic: it defines the entities of the
//! monitoring domain and the repository contracts the database crate
//! implements. Every tenant-scoped operation takes an explicit
//! `organization_id`; there is no implicit default tenant.

pub mod dashboard;
pub mod error;
pub mod models;
pub mod repository;
