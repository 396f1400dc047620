use crate::config::DatabaseConfig;
use sqlx::migrate::MigrateError;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    Connect(sqlx::Error),

    #[error("Database unavailable: {0}")]
    Unavailable(sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] MigrateError),
}

/// Handle kept in the application state for health checks
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Round-trip a trivial query, used by the readiness endpoint
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Unavailable)?;
        Ok(())
    }
}

/// Connect the pool with the configured limits and timeouts
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .test_before_acquire(config.test_before_acquire)
        .connect(&config.url)
        .await
        .map_err(DatabaseError::Connect)
}

/// Apply the migrations embedded from `migrations/`
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
