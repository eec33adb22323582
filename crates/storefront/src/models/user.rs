//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use petalcart_core::{Address, Email, Phone, UserId, UserRole};

use crate::models::cart::CartItem;

/// A storefront account (domain type).
///
/// The single source of truth for identity and shipping data. The `cart`
/// field is the advisory mirror written by the cart cache; it is never read
/// back on the checkout path.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique account key).
    pub email: Email,
    /// Argon2id password hash. Never serialized to clients.
    pub password_hash: String,
    /// Account role.
    pub role: UserRole,
    /// Avatar image reference.
    pub image: Option<String>,
    /// Contact phone number.
    pub phone: Option<Phone>,
    /// Shipping address.
    pub address: Option<Address>,
    /// Advisory cart mirror (eventually consistent with the cart cache).
    pub cart: Option<Vec<CartItem>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may place an order.
    ///
    /// Requires a phone number and a deliverable address. This is the single
    /// server-side gate that prevents orders without a shippable destination;
    /// the client UI gates on the same fields but is not trusted.
    #[must_use]
    pub fn is_checkout_eligible(&self) -> bool {
        self.phone.is_some() && self.address.as_ref().is_some_and(Address::is_deliverable)
    }
}

/// Fields for creating a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: UserRole,
}

/// Partial profile update.
///
/// `None` fields are left untouched. The target account is always derived
/// from the verified credential, never from these fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<Phone>,
    pub address: Option<Address>,
    pub image: Option<String>,
    pub cart: Option<Vec<CartItem>>,
}

impl ProfileUpdate {
    /// An update that only refreshes the cart mirror.
    #[must_use]
    pub fn cart_only(items: Vec<CartItem>) -> Self {
        Self {
            cart: Some(items),
            ..Self::default()
        }
    }
}

/// Client-visible account view (password hash stripped).
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart: Option<Vec<CartItem>>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            image: user.image,
            phone: user.phone,
            address: user.address,
            cart: user.cart,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId::generate(),
            name: "Asha".to_owned(),
            email: Email::parse("a@x.com").unwrap(),
            password_hash: "$argon2id$fake".to_owned(),
            role: UserRole::Customer,
            image: None,
            phone: Some(Phone::parse("9876543210").unwrap()),
            address: Some(Address {
                door_no: "12".to_owned(),
                area: "Koregaon Park".to_owned(),
                landmark: None,
                city: "Pune".to_owned(),
                state: "Maharashtra".to_owned(),
                country: "India".to_owned(),
                zip: "411001".to_owned(),
            }),
            cart: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_complete_profile_is_eligible() {
        assert!(user().is_checkout_eligible());
    }

    #[test]
    fn test_missing_phone_is_ineligible() {
        let mut u = user();
        u.phone = None;
        assert!(!u.is_checkout_eligible());
    }

    #[test]
    fn test_missing_address_is_ineligible() {
        let mut u = user();
        u.address = None;
        assert!(!u.is_checkout_eligible());
    }

    #[test]
    fn test_blank_door_no_is_ineligible() {
        let mut u = user();
        if let Some(a) = u.address.as_mut() {
            a.door_no = String::new();
        }
        assert!(!u.is_checkout_eligible());
    }

    #[test]
    fn test_public_user_has_no_password_hash() {
        let public: PublicUser = user().into();
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "a@x.com");
    }
}
