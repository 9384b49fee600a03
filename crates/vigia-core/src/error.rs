//! Error types for the VIGIA system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VigiaError {
    /// The entity is absent or belongs to another organization. The two
    /// cases are deliberately indistinguishable so that lookups never
    /// leak existence across tenants.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Tenant context missing or invalid")]
    TenantContext,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VigiaResult<T> = Result<T, VigiaError>;
