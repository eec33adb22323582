//! Cart route handlers.
//!
//! Every mutation hits the local cache synchronously (the response reflects
//! it immediately) and triggers a fire-and-forget mirror write to the
//! account store. Mirror failures never reach the client.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use petalcart_core::ProductId;

use crate::error::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::cart::{Cart, CartItem};
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Cart response: the lines plus the advisory display total.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub item_count: u32,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            total: cart.total(),
            item_count: cart.item_count(),
            items: cart.items,
        }
    }
}

/// Current cart for the calling identity.
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Json<CartResponse> {
    let cart = state.carts().get(&claims.email).await;
    Json(cart.into())
}

/// Add a catalog product to the cart.
///
/// The product is resolved from the catalog by ID so the cached snapshot
/// always carries current catalog data, not whatever the client had.
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>, AppError> {
    let quantity = req.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_owned()));
    }

    let product = state
        .catalog()
        .get(&req.product_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {}", req.product_id)))?;

    let cart = state.carts().add(&claims.email, product, quantity).await;
    Ok(Json(cart.into()))
}

/// Empty the cart.
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Json<CartResponse> {
    let cart = state.carts().clear(&claims.email).await;
    Json(cart.into())
}
