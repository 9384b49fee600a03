//! Migration runner tests against in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use surrealdb_types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

async fn applied_migrations(db: &Surreal<surrealdb::engine::local::Db>) -> u64 {
    let mut result = db
        .query("SELECT count() AS total FROM _migration GROUP ALL")
        .await
        .unwrap();
    let rows: Vec<CountRow> = result.take(0).unwrap();
    rows.first().map(|r| r.total).unwrap_or(0)
}

#[tokio::test]
async fn migrations_apply_on_fresh_database() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    vigia_db::run_migrations(&db).await.unwrap();

    assert_eq!(applied_migrations(&db).await, 1);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    vigia_db::run_migrations(&db).await.unwrap();
    // Re-running must not fail or re-apply anything.
    vigia_db::run_migrations(&db).await.unwrap();

    assert_eq!(applied_migrations(&db).await, 1);
}

#[tokio::test]
async fn schema_ddl_is_exposed() {
    let ddl = vigia_db::schema_v1();
    assert!(ddl.contains("DEFINE TABLE organization"));
    assert!(ddl.contains("DEFINE TABLE reset_code"));
}
