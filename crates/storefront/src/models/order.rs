//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use petalcart_core::{Address, Email, OrderId, OrderStatus};

use crate::models::cart::CartItem;

/// A durable order record.
///
/// Immutable once written, except for `status` which is advanced by an
/// external fulfillment process. The shipping address is a frozen copy of the
/// account address at creation time - later profile edits never alter it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_email: Email,
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub shipping_address: Address,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// An order about to be persisted.
///
/// The store assigns `id` and `created_at`; the draft carries everything else.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_email: Email,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
    pub shipping_address: Address,
}
