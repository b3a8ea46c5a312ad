//! Namespaced key-value preferences backed by the `preferences` table.
//!
//! Values are stored as TEXT. The session layer keeps the last signed-in
//! identity here; nothing else about the user is persisted locally.

use rusqlite::{params, Connection};
use std::collections::HashMap;
use ub_core::error::{UbError, UbResult};

/// Accessors over the `preferences` table, scoped by namespace.
pub struct Preferences;

impl Preferences {
    /// Get a raw string value.
    pub fn get(conn: &Connection, namespace: &str, key: &str) -> UbResult<Option<String>> {
        match conn.query_row(
            "SELECT value FROM preferences WHERE namespace = ?1 AND key = ?2",
            params![namespace, key],
            |row| row.get::<_, String>(0),
        ) {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(UbError::Database(e.to_string())),
        }
    }

    /// Get a value, or `default` when the key is absent.
    pub fn get_or(conn: &Connection, namespace: &str, key: &str, default: &str) -> UbResult<String> {
        Ok(Self::get(conn, namespace, key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Set a value (upsert).
    pub fn set(conn: &Connection, namespace: &str, key: &str, value: &str) -> UbResult<()> {
        conn.execute(
            "INSERT INTO preferences (namespace, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value",
            params![namespace, key, value],
        )
        .map_err(|e| UbError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a key. Returns whether anything was deleted.
    pub fn remove(conn: &Connection, namespace: &str, key: &str) -> UbResult<bool> {
        let changed = conn
            .execute(
                "DELETE FROM preferences WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
            )
            .map_err(|e| UbError::Database(e.to_string()))?;
        Ok(changed > 0)
    }

    /// All entries of one namespace.
    pub fn get_all(conn: &Connection, namespace: &str) -> UbResult<HashMap<String, String>> {
        let mut stmt = conn
            .prepare("SELECT key, value FROM preferences WHERE namespace = ?1")
            .map_err(|e| UbError::Database(e.to_string()))?;

        let map = stmt
            .query_map([namespace], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| UbError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(map)
    }

    /// Clear one namespace.
    pub fn clear(conn: &Connection, namespace: &str) -> UbResult<()> {
        conn.execute("DELETE FROM preferences WHERE namespace = ?1", [namespace])
            .map_err(|e| UbError::Database(e.to_string()))?;
        Ok(())
    }
}
