//! Integration tests for the User and ResetCode repository
//! implementations.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;
use vigia_core::error::VigiaError;
use vigia_core::models::user::{CreateUser, UpdateUser};
use vigia_core::repository::{ResetCodeRepository, UserRepository};
use vigia_db::repository::{SurrealResetCodeRepository, SurrealUserRepository};

type Db = surrealdb::engine::local::Db;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vigia_db::run_migrations(&db).await.unwrap();
    db
}

async fn create_alice(repo: &SurrealUserRepository<Db>) -> vigia_core::models::user::User {
    repo.create(CreateUser {
        email: "alice@example.com".into(),
        display_name: "Alice".into(),
        password: "correct-horse".into(),
    })
    .await
    .unwrap()
}

// -----------------------------------------------------------------------
// Users
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = create_alice(&repo).await;
    // The raw password is never stored.
    assert_ne!(user.password_hash, "correct-horse");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let by_id = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(by_id.email, "alice@example.com");

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn user_email_is_unique() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    create_alice(&repo).await;
    let dup = repo
        .create(CreateUser {
            email: "alice@example.com".into(),
            display_name: "Impostor".into(),
            password: "whatever-pw".into(),
        })
        .await;

    assert!(matches!(dup, Err(VigiaError::AlreadyExists { .. })));
}

#[tokio::test]
async fn update_user_display_name() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = create_alice(&repo).await;
    let updated = repo
        .update(
            user.id,
            UpdateUser {
                display_name: Some("Alice L.".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.display_name, "Alice L.");
    assert_eq!(updated.email, "alice@example.com"); // unchanged
}

#[tokio::test]
async fn set_password_replaces_hash() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = create_alice(&repo).await;
    repo.set_password(user.id, "new-password".into())
        .await
        .unwrap();

    let reloaded = repo.get_by_id(user.id).await.unwrap();
    assert_ne!(reloaded.password_hash, user.password_hash);

    let missing = repo.set_password(Uuid::new_v4(), "irrelevant".into()).await;
    assert!(matches!(missing, Err(VigiaError::NotFound { .. })));
}

// -----------------------------------------------------------------------
// Reset codes
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_find_active_code() {
    let db = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let code_repo = SurrealResetCodeRepository::new(db);

    let user = create_alice(&user_repo).await;
    let issued = code_repo.create(user.id, "123456".into()).await.unwrap();
    assert!(!issued.used);

    let found = code_repo
        .find_active(user.id, "123456")
        .await
        .unwrap()
        .expect("code should be active");
    assert_eq!(found.id, issued.id);

    // A different code value does not match.
    assert!(
        code_repo
            .find_active(user.id, "654321")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn duplicate_codes_resolve_to_most_recent() {
    let db = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let code_repo = SurrealResetCodeRepository::new(db.clone());

    let user = create_alice(&user_repo).await;
    let first = code_repo.create(user.id, "111111".into()).await.unwrap();
    // Identical digits drawn twice: allowed, nothing enforces
    // uniqueness.
    db.query("UPDATE reset_code SET created_at = created_at - 1m")
        .await
        .unwrap()
        .check()
        .unwrap();
    let second = code_repo.create(user.id, "111111".into()).await.unwrap();

    let found = code_repo
        .find_active(user.id, "111111")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, second.id);
    assert_ne!(found.id, first.id);
}

#[tokio::test]
async fn invalidate_all_sweeps_unused_codes() {
    let db = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let code_repo = SurrealResetCodeRepository::new(db);

    let user = create_alice(&user_repo).await;
    code_repo.create(user.id, "111111".into()).await.unwrap();
    code_repo.create(user.id, "222222".into()).await.unwrap();

    let swept = code_repo.invalidate_all(user.id).await.unwrap();
    assert_eq!(swept, 2);

    assert!(
        code_repo
            .find_active(user.id, "111111")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        code_repo
            .find_active(user.id, "222222")
            .await
            .unwrap()
            .is_none()
    );

    // Nothing left to sweep.
    assert_eq!(code_repo.invalidate_all(user.id).await.unwrap(), 0);

    // latest_for_user still sees the (now used) newest code.
    let latest = code_repo.latest_for_user(user.id).await.unwrap().unwrap();
    assert!(latest.used);
}

#[tokio::test]
async fn consume_is_single_use() {
    let db = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let code_repo = SurrealResetCodeRepository::new(db);

    let user = create_alice(&user_repo).await;
    let issued = code_repo.create(user.id, "123456".into()).await.unwrap();

    assert!(code_repo.consume(issued.id).await.unwrap());
    // The second attempt loses the race.
    assert!(!code_repo.consume(issued.id).await.unwrap());

    assert!(
        code_repo
            .find_active(user.id, "123456")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn codes_are_scoped_to_their_user() {
    let db = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let code_repo = SurrealResetCodeRepository::new(db);

    let alice = create_alice(&user_repo).await;
    let bob = user_repo
        .create(CreateUser {
            email: "bob@example.com".into(),
            display_name: "Bob".into(),
            password: "bobs-password".into(),
        })
        .await
        .unwrap();

    code_repo.create(alice.id, "123456".into()).await.unwrap();

    assert!(
        code_repo
            .find_active(bob.id, "123456")
            .await
            .unwrap()
            .is_none()
    );
    assert!(code_repo.latest_for_user(bob.id).await.unwrap().is_none());
}
