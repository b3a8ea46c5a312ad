//! Database schema definitions and table creation.
//!
//! Local state is deliberately small: a namespaced preference table and the
//! schema version marker.

use rusqlite::Connection;
use ub_core::error::{UbError, UbResult};
use tracing::info;

/// Create all database tables and indexes if they do not exist.
pub fn create_tables(conn: &Connection) -> UbResult<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| UbError::Database(format!("failed to create schema: {e}")))?;
    info!("database schema verified");
    Ok(())
}

/// Drop all tables (used for database reset).
pub fn drop_tables(conn: &Connection) -> UbResult<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS preferences;
         DROP TABLE IF EXISTS schema_version;",
    )
    .map_err(|e| UbError::Database(format!("failed to drop tables: {e}")))?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Namespaced key-value preferences
CREATE TABLE IF NOT EXISTS preferences (
    namespace   TEXT NOT NULL,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
);
"#;
