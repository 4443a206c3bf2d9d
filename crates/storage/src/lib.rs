//! Storage Layer
//!
//! SQLite persistence for locations, thermometers and temperature readings.
//! Row mapping lives in [`models`], per-table data access and the
//! aggregate queries live on [`Repository`].

mod models;
mod repository;
mod stats;

pub use models::{Location, LocationStats, TemperatureReading, Thermometer, ThermometerStats};
pub use repository::{Repository, DEFAULT_READING_LIMIT, DEMO_LOCATIONS, DEMO_THERMOMETERS_PER_LOCATION};

use sqlx::error::ErrorKind;
use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// A uniqueness constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    /// A referenced row does not exist
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return StorageError::ConstraintViolation(db_err.message().to_string())
                }
                ErrorKind::ForeignKeyViolation => {
                    return StorageError::ForeignKeyViolation(db_err.message().to_string())
                }
                _ => {}
            }
        }
        StorageError::Database(err)
    }
}

/// Open a connection pool against `database_url`.
///
/// Foreign keys are enforced on every connection and the database file is
/// created when it does not exist yet.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!(database_url, max_connections, "Connected to database");
    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database schema up to date");
    Ok(())
}

/// In-memory pool with the schema applied, for tests across the workspace.
///
/// Pinned to a single connection that never expires, since every new
/// in-memory connection would see an empty database.
pub async fn memory_pool() -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name NOT LIKE 'sqlite%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<_> = tables.into_iter().map(|(n,)| n).collect();
        assert_eq!(names, vec!["locations", "temperature_readings", "thermometers"]);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = memory_pool().await.unwrap();
        let err = sqlx::query("INSERT INTO thermometers (name, location_id) VALUES ('T', 42)")
            .execute(&pool)
            .await
            .map_err(StorageError::from)
            .unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation(_)));
    }
}
