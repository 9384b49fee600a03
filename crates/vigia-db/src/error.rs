//! Database-specific error types and conversions.

use vigia_core::error::VigiaError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Row decode failed: {0}")]
    Decode(String),

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify a query-check failure on a write: unique-index violations
    /// become [`DbError::AlreadyExists`], everything else surfaces as a
    /// decode/query failure.
    pub(crate) fn from_check(entity: &str, err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        if msg.contains("already contains") {
            DbError::AlreadyExists {
                entity: entity.into(),
            }
        } else {
            DbError::Decode(msg)
        }
    }
}

impl From<DbError> for VigiaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => VigiaError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => VigiaError::AlreadyExists { entity },
            other => VigiaError::Database(other.to_string()),
        }
    }
}
