//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Auth
//! POST /api/auth/register      - Create account, set session cookie
//! POST /api/auth/login         - Verify password, set session cookie
//! POST /api/auth/logout        - Clear session cookie, drop cached cart
//! GET  /api/auth/me            - Current account (requires auth)
//!
//! # Profile
//! PUT  /api/user/update        - Partial profile update (requires auth);
//!                                target derived from the credential only
//!
//! # Catalog
//! GET  /api/products           - Product listing
//! GET  /api/products/{id}      - Product detail + rendered description
//!
//! # Cart (requires auth)
//! GET  /api/cart               - Cached cart + advisory total
//! POST /api/cart/add           - Add a catalog product, async mirror
//! POST /api/cart/clear         - Empty the cart, async mirror
//!
//! # Checkout & Orders
//! POST /api/checkout           - Place an order from a cart snapshot
//! GET  /api/orders             - Calling identity's orders, newest first
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/clear", post(cart::clear))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .route("/api/user/update", put(account::update))
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .route("/api/checkout", post(checkout::place))
        .route("/api/orders", get(orders::list))
}
