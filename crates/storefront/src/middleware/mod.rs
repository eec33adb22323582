//! Middleware and extractors.

pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, OptionalUser, SESSION_COOKIE_NAME};
pub use request_id::request_id_middleware;
