//! SurrealDB implementation of [`ResetCodeRepository`].
//!
//! Codes are never deleted: a resend or a completed reset sweeps them by
//! flipping `used`. Consumption is a conditional update so that two
//! concurrent completions cannot both claim the same code.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vigia_core::error::VigiaResult;
use vigia_core::models::reset_code::PasswordResetCode;
use vigia_core::repository::ResetCodeRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ResetCodeRow {
    user_id: String,
    code: String,
    used: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ResetCodeRowWithId {
    record_id: String,
    user_id: String,
    code: String,
    used: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid UUID in {field}: {e}")))
}

impl ResetCodeRow {
    fn into_code(self, id: Uuid) -> Result<PasswordResetCode, DbError> {
        Ok(PasswordResetCode {
            id,
            user_id: parse_uuid("user_id", &self.user_id)?,
            code: self.code,
            used: self.used,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ResetCodeRowWithId {
    fn try_into_code(self) -> Result<PasswordResetCode, DbError> {
        let id = parse_uuid("id", &self.record_id)?;
        Ok(PasswordResetCode {
            id,
            user_id: parse_uuid("user_id", &self.user_id)?,
            code: self.code,
            used: self.used,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the reset-code repository.
#[derive(Clone)]
pub struct SurrealResetCodeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealResetCodeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ResetCodeRepository for SurrealResetCodeRepository<C> {
    async fn create(&self, user_id: Uuid, code: String) -> VigiaResult<PasswordResetCode> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('reset_code', $id) SET \
                 user_id = $user_id, code = $code, used = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", user_id.to_string()))
            .bind(("code", code))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("reset_code", e))?;

        let rows: Vec<ResetCodeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "reset_code".into(),
            id: id_str,
        })?;

        Ok(row.into_code(id)?)
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> VigiaResult<Option<PasswordResetCode>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM reset_code \
                 WHERE user_id = $user_id AND code = $code \
                 AND used = false \
                 ORDER BY created_at DESC \
                 LIMIT 1",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("code", code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResetCodeRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_code()?)),
            None => Ok(None),
        }
    }

    async fn latest_for_user(&self, user_id: Uuid) -> VigiaResult<Option<PasswordResetCode>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM reset_code \
                 WHERE user_id = $user_id \
                 ORDER BY created_at DESC \
                 LIMIT 1",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResetCodeRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_code()?)),
            None => Ok(None),
        }
    }

    async fn invalidate_all(&self, user_id: Uuid) -> VigiaResult<u64> {
        // Count outstanding codes first, then sweep them.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM reset_code \
                 WHERE user_id = $user_id AND used = false \
                 GROUP ALL",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query(
                "UPDATE reset_code SET used = true, updated_at = time::now() \
                 WHERE user_id = $user_id AND used = false",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }

    async fn consume(&self, id: Uuid) -> VigiaResult<bool> {
        // Conditional update: only an unused code flips. An empty result
        // means another caller already consumed it.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('reset_code', $id) SET \
                 used = true, updated_at = time::now() \
                 WHERE used = false",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResetCodeRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }
}
