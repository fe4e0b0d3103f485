//! Database migration runner.
//!
//! Migrations live in this crate's `migrations/` directory as plain SQL
//! files named `{timestamp}_{name}.sql` and are embedded at compile time
//! via `sqlx::migrate!`.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{info, warn};

/// Creates the database if it does not exist yet.
///
/// Intended for development and test setups; production databases are
/// provisioned out of band.
pub async fn ensure_database_exists(url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(url).await?;
    }

    Ok(())
}

/// Runs all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration file is malformed or fails to execute.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
