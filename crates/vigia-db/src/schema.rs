//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints. Decimal quantities (kW, kWh) are stored as
//! strings and converted at the repository boundary.
//!
//! Every business table carries a `deleted_at` timestamp; repositories
//! soft-delete by stamping it and exclude stamped rows from all reads.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations (tenancy root)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD email ON TABLE organization TYPE string;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE organization TYPE option<datetime>;
DEFINE INDEX idx_organization_email ON TABLE organization \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Categories (organization scope)
-- =======================================================================
DEFINE TABLE category SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE category TYPE string;
DEFINE FIELD name ON TABLE category TYPE string;
DEFINE FIELD description ON TABLE category TYPE option<string>;
DEFINE FIELD created_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE category TYPE option<datetime>;
DEFINE INDEX idx_category_org_name ON TABLE category \
    COLUMNS organization_id, name UNIQUE;

-- =======================================================================
-- Zones (organization scope)
-- =======================================================================
DEFINE TABLE zone SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE zone TYPE string;
DEFINE FIELD name ON TABLE zone TYPE string;
DEFINE FIELD description ON TABLE zone TYPE option<string>;
DEFINE FIELD location ON TABLE zone TYPE string;
-- Maximum capacity in kW, stored as a decimal string.
DEFINE FIELD max_capacity ON TABLE zone TYPE string;
DEFINE FIELD created_at ON TABLE zone TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE zone TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE zone TYPE option<datetime>;
DEFINE INDEX idx_zone_org_name ON TABLE zone \
    COLUMNS organization_id, name UNIQUE;

-- =======================================================================
-- Devices (organization scope)
-- =======================================================================
DEFINE TABLE device SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE device TYPE string;
DEFINE FIELD name ON TABLE device TYPE string;
DEFINE FIELD model ON TABLE device TYPE string;
-- Field-value rules (power > 0, consumption >= 0) are enforced by the
-- writing repository, not the schema.
DEFINE FIELD power_watts ON TABLE device TYPE int;
DEFINE FIELD consumption ON TABLE device TYPE int;
DEFINE FIELD status ON TABLE device TYPE string \
    ASSERT $value IN ['active', 'inactive', 'maintenance'];
DEFINE FIELD category_id ON TABLE device TYPE string;
DEFINE FIELD zone_id ON TABLE device TYPE string;
DEFINE FIELD created_at ON TABLE device TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE device TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE device TYPE option<datetime>;
DEFINE INDEX idx_device_zone_name ON TABLE device \
    COLUMNS zone_id, name UNIQUE;
DEFINE INDEX idx_device_org ON TABLE device COLUMNS organization_id;
DEFINE INDEX idx_device_org_category ON TABLE device \
    COLUMNS organization_id, category_id;

-- =======================================================================
-- Measurements (organization scope, append-only)
-- =======================================================================
DEFINE TABLE measurement SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD organization_id ON TABLE measurement TYPE string;
DEFINE FIELD device_id ON TABLE measurement TYPE string;
-- Consumption in kWh at 3-decimal precision, stored as a decimal string.
DEFINE FIELD consumption_kwh ON TABLE measurement TYPE string;
DEFINE FIELD timestamp ON TABLE measurement TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_at ON TABLE measurement TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE measurement TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE measurement TYPE option<datetime>;
DEFINE INDEX idx_measurement_org_time ON TABLE measurement \
    COLUMNS organization_id, timestamp;
DEFINE INDEX idx_measurement_device_time ON TABLE measurement \
    COLUMNS device_id, timestamp;

-- =======================================================================
-- Alerts (organization scope, append-only)
-- =======================================================================
DEFINE TABLE alert SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD organization_id ON TABLE alert TYPE string;
DEFINE FIELD device_id ON TABLE alert TYPE string;
DEFINE FIELD alert_type ON TABLE alert TYPE string \
    ASSERT $value IN ['high_consumption', 'device_offline', \
    'zone_limit_exceeded'];
DEFINE FIELD severity ON TABLE alert TYPE string \
    ASSERT $value IN ['Mediano', 'Alto', 'Grave'];
DEFINE FIELD status ON TABLE alert TYPE string \
    ASSERT $value IN ['active', 'resolved', 'dismissed'];
DEFINE FIELD message ON TABLE alert TYPE string;
DEFINE FIELD alert_date ON TABLE alert TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_at ON TABLE alert TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE alert TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE alert TYPE option<datetime>;
DEFINE INDEX idx_alert_org_date ON TABLE alert \
    COLUMNS organization_id, alert_date;
DEFINE INDEX idx_alert_org_severity ON TABLE alert \
    COLUMNS organization_id, severity;

-- =======================================================================
-- Users (global scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD display_name ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Password reset codes (global scope, keyed by user)
-- =======================================================================
DEFINE TABLE reset_code SCHEMAFULL;
DEFINE FIELD user_id ON TABLE reset_code TYPE string;
DEFINE FIELD code ON TABLE reset_code TYPE string;
DEFINE FIELD used ON TABLE reset_code TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE reset_code TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE reset_code TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_reset_code_user ON TABLE reset_code \
    COLUMNS user_id, created_at;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
