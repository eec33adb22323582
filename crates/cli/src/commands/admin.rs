//! Admin account management command.
//!
//! Admin accounts are never created through the public registration
//! endpoint - only here, against the database configured in the environment.

use secrecy::SecretString;
use thiserror::Error;

use petalcart_core::UserRole;
use petalcart_storefront::services::auth::{AuthError, AuthService};

/// Errors that can occur while creating an admin account.
#[derive(Debug, Error)]
pub enum AdminCommandError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Create an admin account.
///
/// # Errors
///
/// Returns `AdminCommandError` if the database is unreachable, the email or
/// password fails validation, or the email is already registered.
pub async fn create_account(
    email: &str,
    name: &str,
    password: &str,
) -> Result<(), AdminCommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PETALCART_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| AdminCommandError::MissingEnvVar("PETALCART_DATABASE_URL"))?;

    let pool = petalcart_storefront::db::create_pool(&database_url).await?;

    let auth = AuthService::new(&pool);
    let user = auth
        .create_account(email, password, Some(name), UserRole::Admin)
        .await?;

    tracing::info!(email = %user.email, id = %user.id, "admin account created");
    Ok(())
}
