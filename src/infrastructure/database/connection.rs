//! `SQLite` connection pool management (SPEC_FULL §6 "Persistence"):
//! WAL-mode journal, bounded pool, and embedded schema migrations.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::DatabaseError;

/// Owns the pool for the lifetime of the process. Repository adapters
/// are constructed from a clone of `pool()`; `SqlitePool` is itself an
/// `Arc`-backed handle, so cloning is cheap.
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Open (creating if absent) a `SQLite` database at `database_url`
    /// with WAL journaling and a bounded connection pool.
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .min_connections(5)
            .max_connections(10)
            .idle_timeout(Duration::from_secs(30))
            .max_lifetime(Duration::from_secs(1800))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Run the embedded migrations under `migrations/`. Idempotent: safe
    /// to call on every process start.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    #[must_use]
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
