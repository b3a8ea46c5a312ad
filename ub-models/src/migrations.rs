//! Versioned database migrations.
//!
//! Migrations run sequentially from the current stored version to the latest.
//! Each migration is idempotent.

use rusqlite::{params, Connection};
use tracing::{info, warn};
use ub_core::constants::{prefs, DB_SCHEMA_VERSION};
use ub_core::error::{UbError, UbResult};

/// Namespace and key used by the mobile client's shared preferences.
const LEGACY_NAMESPACE: &str = "mi_app_prefs";
const LEGACY_IDENTITY_KEY: &str = "usuario";

/// Run all pending migrations on the database.
pub fn run_migrations(conn: &Connection) -> UbResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version >= DB_SCHEMA_VERSION {
        info!("database schema is up to date (version {current_version})");
        return Ok(());
    }

    info!("running migrations from version {current_version} to {DB_SCHEMA_VERSION}");

    for version in (current_version + 1)..=DB_SCHEMA_VERSION {
        run_migration(conn, version)?;
    }

    set_schema_version(conn, DB_SCHEMA_VERSION)?;
    info!("migrations complete, schema at version {DB_SCHEMA_VERSION}");
    Ok(())
}

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> UbResult<i32> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .map_err(|e| UbError::Database(e.to_string()))?;

    if count == 0 {
        conn.execute("INSERT INTO schema_version (version) VALUES (0)", [])
            .map_err(|e| UbError::Database(e.to_string()))?;
        return Ok(0);
    }

    conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
        row.get(0)
    })
    .map_err(|e| UbError::Database(e.to_string()))
}

fn set_schema_version(conn: &Connection, version: i32) -> UbResult<()> {
    conn.execute("UPDATE schema_version SET version = ?1", [version])
        .map_err(|e| UbError::Database(e.to_string()))?;
    Ok(())
}

fn run_migration(conn: &Connection, version: i32) -> UbResult<()> {
    info!("applying migration version {version}");

    match version {
        1 => migration_v1(conn),
        _ => {
            warn!("unknown migration version {version}, skipping");
            Ok(())
        }
    }
}

/// Migration v1: adopt an identity stored under the mobile client's
/// preference names, so an imported preference file keeps its session.
fn migration_v1(conn: &Connection) -> UbResult<()> {
    let moved = conn
        .execute(
            "INSERT OR IGNORE INTO preferences (namespace, key, value)
             SELECT ?1, ?2, value FROM preferences WHERE namespace = ?3 AND key = ?4",
            params![
                prefs::NAMESPACE,
                prefs::ACTIVE_IDENTITY,
                LEGACY_NAMESPACE,
                LEGACY_IDENTITY_KEY
            ],
        )
        .map_err(|e| UbError::Migration(e.to_string()))?;

    conn.execute(
        "DELETE FROM preferences WHERE namespace = ?1",
        [LEGACY_NAMESPACE],
    )
    .map_err(|e| UbError::Migration(e.to_string()))?;

    if moved > 0 {
        info!("migrated stored identity from legacy preferences");
    }
    Ok(())
}
