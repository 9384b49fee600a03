//! Authentication service — login and the password-reset flow.
//!
//! A reset moves through four stages: a code is issued and mailed,
//! verified against the stored copy, and finally consumed when the new
//! password lands. Codes lapse 10 minutes after issue with no background
//! job; validity is an elapsed-time comparison at read time. A resend
//! sweeps every outstanding code before issuing a fresh one.

use chrono::{Duration, Utc};
use vigia_core::error::VigiaError;
use vigia_core::models::reset_code::PasswordResetCode;
use vigia_core::models::user::User;
use vigia_core::repository::{ResetCodeRepository, UserRepository};

use crate::code;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::mailer::Mailer;
use crate::password;

/// Input for the final step of a reset.
#[derive(Debug)]
pub struct CompleteResetInput {
    pub email: String,
    /// The previously verified code, resubmitted with the new password.
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// What a completion attempt produced.
#[derive(Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The credential was changed and the code consumed. Terminal: a
    /// new reset requires a fresh request.
    PasswordChanged,
    /// Both password fields were empty: treated as a re-verification,
    /// not an error. The code remains unconsumed.
    AwaitingPassword,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate.
pub struct AuthService<U: UserRepository, R: ResetCodeRepository, M: Mailer> {
    user_repo: U,
    code_repo: R,
    mailer: M,
    config: AuthConfig,
}

impl<U: UserRepository, R: ResetCodeRepository, M: Mailer> AuthService<U, R, M> {
    pub fn new(user_repo: U, code_repo: R, mailer: M, config: AuthConfig) -> Self {
        Self {
            user_repo,
            code_repo,
            mailer,
            config,
        }
    }

    /// Authenticate a user with email + password.
    ///
    /// An unknown email and a wrong password are indistinguishable to
    /// the caller.
    pub async fn login(&self, email: &str, password_input: &str) -> Result<User, AuthError> {
        let user = self
            .user_repo
            .get_by_email(email)
            .await
            .map_err(|e| match e {
                VigiaError::NotFound { .. } => AuthError::InvalidCredentials,
                other => AuthError::Store(other),
            })?;

        let valid = password::verify_password(
            password_input,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;

        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Issue a reset code for the user registered under `email` and
    /// dispatch it through the notification channel.
    ///
    /// The code row persists even when dispatch fails; the caller sees
    /// the delivery error and can retry with a resend.
    pub async fn request_reset(&self, email: &str) -> Result<(), AuthError> {
        let user = self.user_by_email(email).await?;
        self.issue_and_send(&user).await
    }

    /// Sweep every outstanding code for the user, then issue and
    /// dispatch a fresh one. Only the new code verifies afterwards.
    pub async fn resend_code(&self, email: &str) -> Result<(), AuthError> {
        let user = self.user_by_email(email).await?;
        self.code_repo.invalidate_all(user.id).await?;
        self.issue_and_send(&user).await
    }

    /// Check a submitted code without consuming it. The code stays
    /// unused; only the password submission consumes it.
    pub async fn verify_code(&self, email: &str, submitted: &str) -> Result<(), AuthError> {
        let user = self.user_by_email(email).await?;
        self.valid_code_for(&user, submitted).await?;
        Ok(())
    }

    /// Finish a reset: validate the password pair, re-validate the code,
    /// consume it, and set the new credential.
    ///
    /// The code is consumed with a conditional update *before* the
    /// credential changes, so of two concurrent completions with the
    /// same code exactly one changes the password; the other fails
    /// with [`AuthError::InvalidCode`].
    pub async fn complete_reset(
        &self,
        input: CompleteResetInput,
    ) -> Result<ResetOutcome, AuthError> {
        let user = self.user_by_email(&input.email).await?;

        // An empty resubmission re-renders the verified state.
        if input.new_password.is_empty() && input.confirm_password.is_empty() {
            self.valid_code_for(&user, &input.code).await?;
            return Ok(ResetOutcome::AwaitingPassword);
        }

        if input.new_password != input.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if input.new_password.chars().count() < self.config.min_password_length {
            return Err(AuthError::PasswordTooShort {
                min: self.config.min_password_length,
            });
        }

        let code_row = self.valid_code_for(&user, &input.code).await?;

        if !self.code_repo.consume(code_row.id).await? {
            return Err(AuthError::InvalidCode);
        }

        self.user_repo
            .set_password(user.id, input.new_password)
            .await?;

        // Sweep any other codes still outstanding for this user.
        self.code_repo.invalidate_all(user.id).await?;

        Ok(ResetOutcome::PasswordChanged)
    }

    async fn user_by_email(&self, email: &str) -> Result<User, AuthError> {
        self.user_repo
            .get_by_email(email)
            .await
            .map_err(|e| match e {
                VigiaError::NotFound { .. } => AuthError::UserNotFound,
                other => AuthError::Store(other),
            })
    }

    /// Resolve a submitted code to a currently valid stored code.
    ///
    /// Malformed input is rejected before any lookup. A missing or
    /// already-consumed code is `InvalidCode`; a known code past its
    /// window is `ExpiredCode`, so the caller can route the user back
    /// to a fresh request instead of a retry.
    async fn valid_code_for(
        &self,
        user: &User,
        submitted: &str,
    ) -> Result<PasswordResetCode, AuthError> {
        if !code::is_well_formed(submitted) {
            return Err(AuthError::InvalidCode);
        }

        let found = self
            .code_repo
            .find_active(user.id, submitted)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        let ttl = Duration::seconds(self.config.code_ttl_secs as i64);
        if !found.is_valid(Utc::now(), ttl) {
            return Err(AuthError::ExpiredCode);
        }

        Ok(found)
    }

    async fn issue_and_send(&self, user: &User) -> Result<(), AuthError> {
        let fresh = code::generate_code();
        let issued = self.code_repo.create(user.id, fresh).await?;

        let body = format!(
            "Hello {},\n\nYour password reset code is {}. \
             It expires in {} minutes.\n",
            user.display_name,
            issued.code,
            self.config.code_ttl_secs / 60,
        );

        self.mailer
            .send(&user.email, &self.config.mail_subject, &body)
            .await
            .map_err(|e| AuthError::Delivery(e.to_string()))
    }
}
