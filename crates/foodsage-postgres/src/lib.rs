//! PostgreSQL storage backend for FoodSage
//!
//! Implements the credential and inventory stores on two tables:
//!
//! - `users`: one row per registered user, email unique
//! - `inventory`: one row per non-empty inventory, with a version stamp
//!
//! Inventory writes are single conditional statements (`UPDATE .. WHERE
//! version = $n`, `INSERT .. ON CONFLICT DO NOTHING`), so the database
//! decides which of two racing writers wins.
//!
//! # Example
//!
//! ```ignore
//! use foodsage_postgres::PostgresStorage;
//!
//! let storage = PostgresStorage::connect("postgres://localhost/foodsage", 10, timeout).await?;
//! storage.ensure_schema().await?;
//! let user = storage.find_by_email("ann@example.com").await?;
//! ```

mod inventory;
mod schema;
mod users;

use std::time::Duration;

use foodsage_storage::{StorageError, StorageResult};
use sqlx_core::pool::{Pool, PoolOptions};
use sqlx_core::query::query;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

/// PostgreSQL-backed user and inventory storage.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be opened.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> StorageResult<Self> {
        let pool = PoolOptions::<Postgres>::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        tracing::info!(max_connections, "connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Creates the tables if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    pub async fn ensure_schema(&self) -> StorageResult<()> {
        for statement in schema::STATEMENTS {
            query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        tracing::debug!("schema ready");
        Ok(())
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Maps a driver error onto the storage taxonomy.
///
/// Pool exhaustion and transport failures mean the store is unreachable;
/// everything else is reported as internal.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx_core::Error) -> StorageError {
    match err {
        sqlx_core::Error::PoolTimedOut => StorageError::timeout(operation),
        sqlx_core::Error::PoolClosed => StorageError::connection_error("connection pool closed"),
        sqlx_core::Error::Io(e) => StorageError::connection_error(e.to_string()),
        sqlx_core::Error::Tls(e) => StorageError::connection_error(e.to_string()),
        other => {
            tracing::error!(operation, error = %other, "database error");
            StorageError::internal(format!("{operation}: {other}"))
        }
    }
}

/// Converts a stored version stamp, rejecting negative values.
pub(crate) fn version_from_db(version: i64) -> StorageResult<u64> {
    u64::try_from(version)
        .map_err(|_| StorageError::internal(format!("negative inventory version {version}")))
}

pub(crate) fn version_to_db(version: u64) -> StorageResult<i64> {
    i64::try_from(version)
        .map_err(|_| StorageError::invalid_input(format!("version {version} out of range")))
}
