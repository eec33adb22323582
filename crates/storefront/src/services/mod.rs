//! Business-logic services.
//!
//! - [`auth`] - registration and login (password hashing, uniqueness)
//! - [`token`] - stateless signed session credentials
//! - [`cart`] - the local cart cache and its asynchronous mirror
//! - [`checkout`] - the transaction that turns a cart into an order

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use cart::CartCache;
pub use checkout::{CheckoutError, CheckoutService};
pub use token::{TokenClaims, TokenError, TokenService};
