//! Database initialization, connection pooling, and lifecycle management.
//!
//! Uses SQLite in WAL mode with r2d2 connection pooling.
//! Runs integrity checks on startup and applies versioned migrations.

use std::path::Path;
use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{error, info, warn};

use ub_core::config::StorageConfig;
use ub_core::error::{UbError, UbResult};

use crate::migrations;
use crate::schema;

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database wrapper providing initialization, pooling, and lifecycle management.
#[derive(Clone)]
pub struct Database {
    pool: Arc<DbPool>,
}

impl Database {
    /// Initialize the database at the given path.
    ///
    /// Creates parent directories, builds the pool with per-connection
    /// pragmas, optionally runs an integrity check, then creates the schema
    /// and applies pending migrations.
    pub fn init(db_path: &Path, config: &StorageConfig) -> UbResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("initializing database at {}", db_path.display());

        let manager = SqliteConnectionManager::file(db_path);
        Self::from_manager(manager, config, true)
    }

    /// In-memory database with a single connection, for tests and offline runs.
    pub fn in_memory() -> UbResult<Self> {
        let config = StorageConfig {
            wal_mode: false,
            pool_size: 1,
            ..StorageConfig::default()
        };
        Self::from_manager(SqliteConnectionManager::memory(), &config, false)
    }

    fn from_manager(
        manager: SqliteConnectionManager,
        config: &StorageConfig,
        persistent: bool,
    ) -> UbResult<Self> {
        let mut builder = Pool::builder().max_size(config.pool_size.max(1));
        if !persistent {
            // Each in-memory connection is its own database; never recycle it.
            builder = builder.idle_timeout(None).max_lifetime(None);
        }
        let pool = builder
            .connection_customizer(Box::new(ConnectionCustomizer {
                wal_mode: config.wal_mode,
            }))
            .build(manager)
            .map_err(|e| UbError::Pool(e.to_string()))?;

        let db = Self {
            pool: Arc::new(pool),
        };

        if config.integrity_check_on_startup {
            db.run_integrity_check()?;
        }

        {
            let conn = db.conn()?;
            schema::create_tables(&conn)?;
            migrations::run_migrations(&conn)?;
        }

        info!("database initialized successfully");
        Ok(db)
    }

    /// Get a connection from the pool.
    pub fn conn(&self) -> UbResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| UbError::Pool(e.to_string()))
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run a SQLite integrity check.
    pub fn run_integrity_check(&self) -> UbResult<()> {
        let conn = self.conn()?;
        let result: String = conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))
            .map_err(|e| UbError::Database(e.to_string()))?;

        if result != "ok" {
            error!("database integrity check failed: {result}");
            return Err(UbError::IntegrityCheck(result));
        }

        info!("database integrity check passed");
        Ok(())
    }

    /// Number of stored preference entries.
    pub fn preference_count(&self) -> UbResult<i64> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM preferences", [], |row| row.get(0))
            .map_err(|e| UbError::Database(e.to_string()))
    }

    /// Reset the database by dropping and recreating all tables.
    pub fn reset(&self) -> UbResult<()> {
        warn!("resetting database - stored preferences will be lost");
        let conn = self.conn()?;
        schema::drop_tables(&conn)?;
        schema::create_tables(&conn)?;
        migrations::run_migrations(&conn)?;
        info!("database reset complete");
        Ok(())
    }
}

/// r2d2 connection customizer that applies PRAGMA settings.
#[derive(Debug)]
struct ConnectionCustomizer {
    wal_mode: bool,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        if self.wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }

        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;
             PRAGMA busy_timeout=5000;",
        )?;

        Ok(())
    }
}
