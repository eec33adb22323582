//! Order repository for database operations.
//!
//! Orders are append-mostly: this crate only inserts and lists. Status
//! transitions belong to an external fulfillment process and have no
//! repository method here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use petalcart_core::{Address, Email, OrderId, OrderStatus};

use super::RepositoryError;
use crate::models::cart::CartItem;
use crate::models::order::{Order, OrderDraft};

const ORDER_COLUMNS: &str =
    "id, user_email, items, total_amount, shipping_address, status, created_at";

/// Raw database row for an order.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_email: Email,
    items: Json<Vec<CartItem>>,
    total_amount: Decimal,
    shipping_address: Json<Address>,
    status: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order, RepositoryError> {
        let status: OrderStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: self.id,
            user_email: self.user_email,
            items: self.items.0,
            total_amount: self.total_amount,
            shipping_address: self.shipping_address.0,
            status,
            created_at: self.created_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order draft.
    ///
    /// The store assigns the ID and creation timestamp; the insert either
    /// fully succeeds or writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (user_email, items, total_amount, shipping_address, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(draft.user_email.as_str())
        .bind(Json(&draft.items))
        .bind(draft.total_amount)
        .bind(Json(&draft.shipping_address))
        .bind(OrderStatus::Pending.to_string())
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// List all orders for an identity, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_by_email(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_email = $1 ORDER BY created_at DESC"
        ))
        .bind(email.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }
}
