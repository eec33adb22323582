//! Checkout route handler.
//!
//! Thin transport wrapper over [`crate::services::checkout`]: the raw cookie
//! goes in (credential verification happens *inside* the transaction), and
//! on success the identity's cached cart is invalidated.

use axum::{Json, extract::State, http::HeaderMap};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::auth::token_from_headers;
use crate::models::order::Order;
use crate::services::checkout::{CartSnapshot, CheckoutService};
use crate::state::AppState;

/// Successful checkout response.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: Order,
}

/// Place an order from a client-submitted cart snapshot.
pub async fn place(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(snapshot): Json<CartSnapshot>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let credential = token_from_headers(&headers);

    let checkout = CheckoutService::new(
        state.pool(),
        state.tokens(),
        state.config().store_timeout,
    );
    let order = checkout
        .place_order(credential.as_deref(), snapshot)
        .await?;

    // Checkout-success invalidation signal: the next cart read starts empty
    state.carts().invalidate(&order.user_email).await;

    Ok(Json(CheckoutResponse {
        success: true,
        order,
    }))
}
