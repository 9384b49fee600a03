//! Integration tests for the password-reset flow against in-memory
//! SurrealDB.

use std::sync::{Arc, Mutex};

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;
use vigia_auth::mailer::{DeliveryError, Mailer};
use vigia_auth::service::CompleteResetInput;
use vigia_auth::{AuthConfig, AuthError, AuthService, ResetOutcome};
use vigia_core::models::user::CreateUser;
use vigia_core::repository::{ResetCodeRepository, UserRepository};
use vigia_db::repository::{SurrealResetCodeRepository, SurrealUserRepository};

type Db = surrealdb::engine::local::Db;

/// Records every message instead of delivering it.
#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl Mailer for RecordingMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.into(), subject.into(), body.into()));
        Ok(())
    }
}

/// Always fails to deliver.
struct FailingMailer;

impl Mailer for FailingMailer {
    async fn send(&self, recipient: &str, _: &str, _: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError {
            recipient: recipient.into(),
            reason: "smtp unreachable".into(),
        })
    }
}

struct Fixture {
    db: Surreal<Db>,
    user_id: Uuid,
    mailer: RecordingMailer,
    service: AuthService<SurrealUserRepository<Db>, SurrealResetCodeRepository<Db>, RecordingMailer>,
}

const EMAIL: &str = "alice@example.com";
const OLD_PASSWORD: &str = "original-pw";

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vigia_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo
        .create(CreateUser {
            email: EMAIL.into(),
            display_name: "Alice".into(),
            password: OLD_PASSWORD.into(),
        })
        .await
        .unwrap();

    let mailer = RecordingMailer::default();
    let service = AuthService::new(
        user_repo,
        SurrealResetCodeRepository::new(db.clone()),
        mailer.clone(),
        AuthConfig::default(),
    );

    Fixture {
        db,
        user_id: user.id,
        mailer,
        service,
    }
}

impl Fixture {
    /// The most recently issued code for the fixture user.
    async fn latest_code(&self) -> vigia_core::models::reset_code::PasswordResetCode {
        SurrealResetCodeRepository::new(self.db.clone())
            .latest_for_user(self.user_id)
            .await
            .unwrap()
            .expect("a code should have been issued")
    }

    /// Rewind every stored code so the validity window has lapsed.
    async fn expire_codes(&self) {
        self.db
            .query("UPDATE reset_code SET created_at = time::now() - 11m")
            .await
            .unwrap()
            .check()
            .unwrap();
    }

    fn complete(&self, code: &str, new: &str, confirm: &str) -> CompleteResetInput {
        CompleteResetInput {
            email: EMAIL.into(),
            code: code.into(),
            new_password: new.into(),
            confirm_password: confirm.into(),
        }
    }
}

// -----------------------------------------------------------------------
// Request & resend
// -----------------------------------------------------------------------

#[tokio::test]
async fn request_persists_code_and_mails_it() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();

    let code = f.latest_code().await;
    assert_eq!(code.code.len(), 6);
    assert!(code.code.bytes().all(|b| b.is_ascii_digit()));
    assert!(!code.used);

    let sent = f.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, EMAIL);
    assert!(sent[0].2.contains(&code.code));
}

#[tokio::test]
async fn request_for_unknown_email_fails() {
    let f = setup().await;

    let result = f.service.request_reset("nobody@example.com").await;
    assert!(matches!(result, Err(AuthError::UserNotFound)));
    assert!(f.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delivery_failure_still_persists_code() {
    let f = setup().await;
    let failing = AuthService::new(
        SurrealUserRepository::new(f.db.clone()),
        SurrealResetCodeRepository::new(f.db.clone()),
        FailingMailer,
        AuthConfig::default(),
    );

    let result = failing.request_reset(EMAIL).await;
    assert!(matches!(result, Err(AuthError::Delivery(_))));

    // The accepted inconsistency: the code row is already there and
    // remains verifiable.
    let code = f.latest_code().await;
    f.service.verify_code(EMAIL, &code.code).await.unwrap();
}

#[tokio::test]
async fn resend_invalidates_prior_codes() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let first = f.latest_code().await;

    f.service.resend_code(EMAIL).await.unwrap();
    f.service.resend_code(EMAIL).await.unwrap();
    let latest = f.latest_code().await;
    assert_ne!(latest.id, first.id);

    // Only the latest issued code verifies.
    f.service.verify_code(EMAIL, &latest.code).await.unwrap();
    if latest.code != first.code {
        let stale = f.service.verify_code(EMAIL, &first.code).await;
        assert!(matches!(stale, Err(AuthError::InvalidCode)));
    }
}

// -----------------------------------------------------------------------
// Verify
// -----------------------------------------------------------------------

#[tokio::test]
async fn verify_rejects_malformed_codes_before_lookup() {
    let f = setup().await;

    for bad in ["", "12345", "1234567", "12a456", "abcdef"] {
        let result = f.service.verify_code(EMAIL, bad).await;
        assert!(matches!(result, Err(AuthError::InvalidCode)), "input {bad:?}");
    }
}

#[tokio::test]
async fn verify_wrong_code_is_invalid() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let issued = f.latest_code().await;

    // Any 6-digit value other than the stored one.
    let wrong = if issued.code == "000000" { "000001" } else { "000000" };
    let result = f.service.verify_code(EMAIL, wrong).await;
    assert!(matches!(result, Err(AuthError::InvalidCode)));

    // Verification must not consume the stored code.
    assert!(!f.latest_code().await.used);
}

#[tokio::test]
async fn verify_does_not_consume() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let code = f.latest_code().await.code;

    f.service.verify_code(EMAIL, &code).await.unwrap();
    f.service.verify_code(EMAIL, &code).await.unwrap();
    assert!(!f.latest_code().await.used);
}

#[tokio::test]
async fn expired_code_reports_expiry_not_invalidity() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let code = f.latest_code().await.code;
    f.expire_codes().await;

    let result = f.service.verify_code(EMAIL, &code).await;
    assert!(matches!(result, Err(AuthError::ExpiredCode)));
}

// -----------------------------------------------------------------------
// Complete
// -----------------------------------------------------------------------

#[tokio::test]
async fn full_reset_roundtrip() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let code = f.latest_code().await.code;

    f.service.verify_code(EMAIL, &code).await.unwrap();

    let outcome = f
        .service
        .complete_reset(f.complete(&code, "brand-new-pw", "brand-new-pw"))
        .await
        .unwrap();
    assert_eq!(outcome, ResetOutcome::PasswordChanged);
    assert!(f.latest_code().await.used);

    // The new credential works, the old one no longer does.
    f.service.login(EMAIL, "brand-new-pw").await.unwrap();
    let old = f.service.login(EMAIL, OLD_PASSWORD).await;
    assert!(matches!(old, Err(AuthError::InvalidCredentials)));

    // The consumed code never verifies again.
    let replay = f.service.verify_code(EMAIL, &code).await;
    assert!(matches!(replay, Err(AuthError::InvalidCode)));
}

#[tokio::test]
async fn empty_password_pair_reverifies_without_consuming() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let code = f.latest_code().await.code;

    let outcome = f
        .service
        .complete_reset(f.complete(&code, "", ""))
        .await
        .unwrap();
    assert_eq!(outcome, ResetOutcome::AwaitingPassword);
    assert!(!f.latest_code().await.used);

    // The flow can still finish afterwards.
    let outcome = f
        .service
        .complete_reset(f.complete(&code, "brand-new-pw", "brand-new-pw"))
        .await
        .unwrap();
    assert_eq!(outcome, ResetOutcome::PasswordChanged);
}

#[tokio::test]
async fn mismatched_passwords_rejected_without_consuming() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let code = f.latest_code().await.code;

    let result = f
        .service
        .complete_reset(f.complete(&code, "brand-new-pw", "different-pw"))
        .await;
    assert!(matches!(result, Err(AuthError::PasswordMismatch)));
    assert!(!f.latest_code().await.used);

    // The original password still logs in.
    f.service.login(EMAIL, OLD_PASSWORD).await.unwrap();
}

#[tokio::test]
async fn short_password_rejected() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let code = f.latest_code().await.code;

    let result = f
        .service
        .complete_reset(f.complete(&code, "five5", "five5"))
        .await;
    assert!(matches!(
        result,
        Err(AuthError::PasswordTooShort { min: 6 })
    ));
    assert!(!f.latest_code().await.used);
}

#[tokio::test]
async fn expired_code_cannot_complete() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let code = f.latest_code().await.code;
    f.expire_codes().await;

    let result = f
        .service
        .complete_reset(f.complete(&code, "brand-new-pw", "brand-new-pw"))
        .await;
    assert!(matches!(result, Err(AuthError::ExpiredCode)));

    f.service.login(EMAIL, OLD_PASSWORD).await.unwrap();
}

#[tokio::test]
async fn duplicate_completion_changes_password_once() {
    let f = setup().await;

    f.service.request_reset(EMAIL).await.unwrap();
    let code = f.latest_code().await.code;

    let first = f
        .service
        .complete_reset(f.complete(&code, "first-new-pw", "first-new-pw"))
        .await
        .unwrap();
    assert_eq!(first, ResetOutcome::PasswordChanged);

    // A second submission with the same still-remembered code loses the
    // conditional update and must not reset again.
    let second = f
        .service
        .complete_reset(f.complete(&code, "second-new-pw", "second-new-pw"))
        .await;
    assert!(matches!(second, Err(AuthError::InvalidCode)));

    // End state: one final password, code marked used.
    f.service.login(EMAIL, "first-new-pw").await.unwrap();
    let rejected = f.service.login(EMAIL, "second-new-pw").await;
    assert!(matches!(rejected, Err(AuthError::InvalidCredentials)));
    assert!(f.latest_code().await.used);
}

// -----------------------------------------------------------------------
// Login
// -----------------------------------------------------------------------

#[tokio::test]
async fn login_with_correct_password() {
    let f = setup().await;

    let user = f.service.login(EMAIL, OLD_PASSWORD).await.unwrap();
    assert_eq!(user.email, EMAIL);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let f = setup().await;

    let wrong_pw = f.service.login(EMAIL, "not-the-password").await;
    assert!(matches!(wrong_pw, Err(AuthError::InvalidCredentials)));

    let unknown_user = f.service.login("ghost@example.com", OLD_PASSWORD).await;
    assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
}
