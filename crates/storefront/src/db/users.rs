//! User repository for database operations.
//!
//! The accounts table is the single source of truth for identity and shipping
//! data. The `address` and `cart` columns are JSONB; both are decoded into
//! validated domain types on the way out.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use petalcart_core::{Address, Email, Phone, UserId, UserRole};

use super::RepositoryError;
use crate::models::cart::CartItem;
use crate::models::user::{NewUser, ProfileUpdate, User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, image, phone, address, cart, created_at, updated_at";

/// Raw database row for a user.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    image: Option<String>,
    phone: Option<String>,
    address: Option<Json<Address>>,
    cart: Option<Json<Vec<CartItem>>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert a raw row into the validated domain type.
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let phone = self
            .phone
            .map(|p| Phone::parse(&p))
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;

        let role: UserRole = self.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(User {
            id: self.id,
            name: self.name,
            email,
            password_hash: self.password_hash,
            role,
            image: self.image,
            phone,
            address: self.address.map(|Json(a)| a),
            cart: self.cart.map(|Json(c)| c),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.id)
        .bind(&new_user.name)
        .bind(new_user.email.as_str())
        .bind(&new_user.password_hash)
        .bind(new_user.role.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_domain()
    }

    /// Apply a partial profile update to the account with the given email.
    ///
    /// `None` fields are left as-is (COALESCE). Returns `Ok(None)` when no
    /// account matches the email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn update_profile(
        &self,
        email: &Email,
        update: ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                 name = COALESCE($2, name), \
                 phone = COALESCE($3, phone), \
                 address = COALESCE($4, address), \
                 image = COALESCE($5, image), \
                 cart = COALESCE($6, cart), \
                 updated_at = now() \
             WHERE email = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(update.name)
        .bind(update.phone.map(String::from))
        .bind(update.address.map(Json))
        .bind(update.image)
        .bind(update.cart.map(Json))
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }
}
