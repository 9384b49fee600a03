//! Password-reset code domain model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A short-lived one-time code proving control of a user's email address
/// during password reset. Not tenant-scoped; keyed purely by user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetCode {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Exactly 6 decimal digits. No uniqueness is enforced against other
    /// outstanding codes.
    pub code: String,
    /// Set once, when the code is consumed by a completed reset (or
    /// swept by a resend's invalidation pass).
    pub used: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PasswordResetCode {
    /// A code authorizes a credential change only while it is unused and
    /// younger than `ttl`. Validity is evaluated at read time; nothing
    /// expires codes in the background.
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.used && now - self.created_at < ttl
    }
}
