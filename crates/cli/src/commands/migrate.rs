//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! petalcart migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PETALCART_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use std::path::Path;

use secrecy::SecretString;
use sqlx::migrate::Migrator;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Run the storefront database migrations.
///
/// Migrations live in `crates/storefront/migrations/` and are applied at
/// runtime; the server never migrates on startup.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails to apply.
pub async fn storefront() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PETALCART_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("PETALCART_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = petalcart_storefront::db::create_pool(&database_url).await?;

    tracing::info!("Running storefront migrations...");
    let migrator = Migrator::new(Path::new("crates/storefront/migrations")).await?;
    migrator.run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
