//! Core types for Petalcart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;
pub mod phone;
pub mod role;
pub mod status;

pub use address::Address;
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use role::UserRole;
pub use status::OrderStatus;
