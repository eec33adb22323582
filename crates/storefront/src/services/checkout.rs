//! The checkout transaction.
//!
//! Converts a client-held cart snapshot into a durable order. The client is
//! untrusted: the credential is verified first, the shipping address is
//! re-derived from the account store, and profile completeness is enforced
//! server-side even though the client UI gates on the same fields.
//!
//! The trust policy is deliberately asymmetric: submitted items and total are
//! accepted as given (item/price tampering is an accepted lesser threat),
//! while the delivery address always comes from the server-held account
//! record, defending against shipping-address spoofing.
//!
//! No retries happen inside the transaction and no idempotency key ties a
//! submission to a logical attempt - a failed call must be resubmitted in
//! full, and two concurrent submissions from the same identity may both
//! succeed.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use petalcart_core::Email;

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::models::cart::CartItem;
use crate::models::order::{Order, OrderDraft};
use crate::models::user::User;
use crate::services::token::TokenService;

/// Checkout failure kinds.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No, invalid, or expired credential.
    #[error("not authenticated")]
    Unauthenticated,

    /// Account is missing the phone number or a deliverable address.
    #[error("profile incomplete")]
    ProfileIncomplete,

    /// The submitted cart snapshot has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// The backing store failed or timed out; nothing was written.
    #[error("store unavailable")]
    StoreUnavailable,
}

/// Client-submitted cart snapshot.
///
/// Top-level unknown fields are tolerated (and ignored) on purpose: clients
/// may post address-like fields here, and the contract is that they have no
/// effect rather than that they are rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    #[serde(rename = "totalAmount", with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

/// Account lookup as seen by the checkout transaction.
///
/// A trait seam so the transaction can be exercised against in-memory fakes;
/// the Postgres repositories implement it for production.
pub trait AccountStore {
    /// Fetch an account by email.
    fn fetch_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;
}

/// Order persistence as seen by the checkout transaction.
pub trait OrderStore {
    /// Persist a draft; the store assigns id and timestamp.
    fn insert_order(
        &self,
        draft: &OrderDraft,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;
}

impl AccountStore for UserRepository<'_> {
    async fn fetch_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        self.get_by_email(email).await
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn insert_order(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        self.insert(draft).await
    }
}

/// The checkout transaction.
pub struct CheckoutService<'a, A, O> {
    tokens: &'a TokenService,
    accounts: A,
    orders: O,
    store_timeout: Duration,
}

impl<'a> CheckoutService<'a, UserRepository<'a>, OrderRepository<'a>> {
    /// Create a checkout service backed by the Postgres repositories.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService, store_timeout: Duration) -> Self {
        Self {
            tokens,
            accounts: UserRepository::new(pool),
            orders: OrderRepository::new(pool),
            store_timeout,
        }
    }
}

impl<'a, A: AccountStore, O: OrderStore> CheckoutService<'a, A, O> {
    /// Create a checkout service over explicit stores (tests).
    #[must_use]
    pub const fn with_stores(
        tokens: &'a TokenService,
        accounts: A,
        orders: O,
        store_timeout: Duration,
    ) -> Self {
        Self {
            tokens,
            accounts,
            orders,
            store_timeout,
        }
    }

    /// Place an order from a client-submitted cart snapshot.
    ///
    /// One sequential chain: verify credential, fetch the authoritative
    /// account, gate on profile completeness, persist. Each store call is
    /// bounded by the configured timeout; elapsed timeouts and store errors
    /// surface as `StoreUnavailable`, never as raw infrastructure errors.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` - absent, malformed, or expired credential
    /// - `ProfileIncomplete` - phone or deliverable address missing
    /// - `EmptyCart` - the snapshot has no items
    /// - `StoreUnavailable` - a backing-store call failed or timed out
    pub async fn place_order(
        &self,
        credential: Option<&str>,
        snapshot: CartSnapshot,
    ) -> Result<Order, CheckoutError> {
        // 1. Verify the credential
        let token = credential.ok_or(CheckoutError::Unauthenticated)?;
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| CheckoutError::Unauthenticated)?;

        // 2. Fetch the account by the *verified* email and gate on
        //    completeness - the one server-side check that prevents orders
        //    without a deliverable destination
        let account = tokio::time::timeout(
            self.store_timeout,
            self.accounts.fetch_by_email(&claims.email),
        )
        .await
        .map_err(|_| CheckoutError::StoreUnavailable)?
        .map_err(|e| {
            tracing::error!("checkout account fetch failed: {e}");
            CheckoutError::StoreUnavailable
        })?;

        let shipping_address = match account {
            Some(ref user) if user.is_checkout_eligible() => {
                // Eligibility guarantees the address is present
                user.address
                    .clone()
                    .ok_or(CheckoutError::ProfileIncomplete)?
            }
            _ => return Err(CheckoutError::ProfileIncomplete),
        };

        // 3. Reject empty snapshots
        if snapshot.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // 4. Client-submitted items and total, server-held address
        let draft = OrderDraft {
            user_email: claims.email,
            items: snapshot.items,
            total_amount: snapshot.total_amount,
            shipping_address,
        };

        // 5. Persist; a failed insert writes nothing
        let order = tokio::time::timeout(self.store_timeout, self.orders.insert_order(&draft))
            .await
            .map_err(|_| CheckoutError::StoreUnavailable)?
            .map_err(|e| {
                tracing::error!("checkout order insert failed: {e}");
                CheckoutError::StoreUnavailable
            })?;

        tracing::info!(
            order_id = %order.id,
            email = %order.user_email,
            "order placed"
        );

        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{Availability, Product};
    use chrono::Utc;
    use petalcart_core::{Address, OrderId, OrderStatus, Phone, ProductId, UserId, UserRole};
    use secrecy::SecretString;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // =========================================================================
    // In-memory fakes
    // =========================================================================

    struct FakeAccounts(HashMap<String, User>);

    impl AccountStore for FakeAccounts {
        async fn fetch_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
            Ok(self.0.get(email.as_str()).cloned())
        }
    }

    /// Records inserted drafts so tests can assert "no write happened".
    #[derive(Clone, Default)]
    struct FakeOrders {
        inserted: Arc<Mutex<Vec<OrderDraft>>>,
    }

    impl OrderStore for FakeOrders {
        async fn insert_order(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
            self.inserted.lock().unwrap().push(draft.clone());
            Ok(Order {
                id: OrderId::generate(),
                user_email: draft.user_email.clone(),
                items: draft.items.clone(),
                total_amount: draft.total_amount,
                shipping_address: draft.shipping_address.clone(),
                status: OrderStatus::Pending,
                created_at: Utc::now(),
            })
        }
    }

    /// A store that always fails.
    struct FailingOrders;

    impl OrderStore for FailingOrders {
        async fn insert_order(&self, _draft: &OrderDraft) -> Result<Order, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    /// A store that never answers (drives the timeout path).
    struct HangingAccounts;

    impl AccountStore for HangingAccounts {
        async fn fetch_by_email(&self, _email: &Email) -> Result<Option<User>, RepositoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    fn tokens() -> TokenService {
        TokenService::new(&SecretString::from("kD8#mQ2$vX9!pL4@wN7%rT1&yU5^zB3*"))
    }

    fn pune_address() -> Address {
        Address {
            door_no: "12".to_owned(),
            area: "Koregaon Park".to_owned(),
            landmark: None,
            city: "Pune".to_owned(),
            state: "Maharashtra".to_owned(),
            country: "India".to_owned(),
            zip: "411001".to_owned(),
        }
    }

    fn eligible_user(email: &str) -> User {
        User {
            id: UserId::generate(),
            name: "Asha".to_owned(),
            email: Email::parse(email).unwrap(),
            password_hash: "$argon2id$fake".to_owned(),
            role: UserRole::Customer,
            image: None,
            phone: Some(Phone::parse("9876543210").unwrap()),
            address: Some(pune_address()),
            cart: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn accounts_with(user: User) -> FakeAccounts {
        let mut map = HashMap::new();
        map.insert(user.email.as_str().to_owned(), user);
        FakeAccounts(map)
    }

    fn snapshot() -> CartSnapshot {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Areca Catechu Flower".to_owned(),
            category: "pooja".to_owned(),
            price: Decimal::from(100),
            discount: Decimal::from(10),
            availability: Availability::Anytime,
            quantity_unit: "bunch".to_owned(),
            images: Vec::new(),
            description: String::new(),
            tags: Vec::new(),
        };

        CartSnapshot {
            items: vec![CartItem {
                product,
                quantity: 2,
            }],
            total_amount: Decimal::new(18000, 2),
        }
    }

    fn credential_for(tokens: &TokenService, user: &User) -> String {
        tokens.issue(user.id, &user.email, user.role).unwrap()
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    // =========================================================================
    // Properties
    // =========================================================================

    #[tokio::test]
    async fn test_place_order_uses_server_address() {
        let tokens = tokens();
        let user = eligible_user("a@x.com");
        let credential = credential_for(&tokens, &user);
        let orders = FakeOrders::default();
        let checkout =
            CheckoutService::with_stores(&tokens, accounts_with(user), orders.clone(), TIMEOUT);

        let order = checkout
            .place_order(Some(&credential), snapshot())
            .await
            .unwrap();

        // Server-held address wins, regardless of anything in the payload
        assert_eq!(order.shipping_address.city, "Pune");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_amount, Decimal::new(18000, 2));
        assert_eq!(order.user_email.as_str(), "a@x.com");
        assert_eq!(orders.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payload_address_fields_are_ignored() {
        let tokens = tokens();
        let user = eligible_user("a@x.com");
        let credential = credential_for(&tokens, &user);
        let orders = FakeOrders::default();
        let checkout =
            CheckoutService::with_stores(&tokens, accounts_with(user), orders.clone(), TIMEOUT);

        // A tampering client smuggles address fields into the payload, both
        // at the top level and inside an item
        let json = r#"{
            "items": [{
                "id": "p1",
                "name": "Areca Catechu Flower",
                "category": "pooja",
                "price": 100,
                "discount": 10,
                "availability": "anytime",
                "quantityUnit": "bunch",
                "quantity": 2,
                "address": {"doorNo": "99", "city": "Mumbai"}
            }],
            "totalAmount": 180.0,
            "shippingAddress": {"doorNo": "99", "city": "Mumbai"}
        }"#;
        let snapshot: CartSnapshot = serde_json::from_str(json).unwrap();

        let order = checkout
            .place_order(Some(&credential), snapshot)
            .await
            .unwrap();

        // The server-held address wins
        assert_eq!(order.shipping_address.city, "Pune");
        assert_eq!(order.shipping_address.door_no, "12");
    }

    #[tokio::test]
    async fn test_missing_phone_fails_profile_incomplete_without_insert() {
        let tokens = tokens();
        let mut user = eligible_user("a@x.com");
        user.phone = None;
        let credential = credential_for(&tokens, &user);
        let orders = FakeOrders::default();
        let checkout =
            CheckoutService::with_stores(&tokens, accounts_with(user), orders.clone(), TIMEOUT);

        let result = checkout.place_order(Some(&credential), snapshot()).await;

        assert!(matches!(result, Err(CheckoutError::ProfileIncomplete)));
        // The order store never saw an insert
        assert!(orders.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_door_no_fails_profile_incomplete() {
        let tokens = tokens();
        let mut user = eligible_user("a@x.com");
        if let Some(a) = user.address.as_mut() {
            a.door_no = String::new();
        }
        let credential = credential_for(&tokens, &user);
        let checkout = CheckoutService::with_stores(
            &tokens,
            accounts_with(user),
            FakeOrders::default(),
            TIMEOUT,
        );

        let result = checkout.place_order(Some(&credential), snapshot()).await;
        assert!(matches!(result, Err(CheckoutError::ProfileIncomplete)));
    }

    #[tokio::test]
    async fn test_unknown_account_fails_profile_incomplete() {
        let tokens = tokens();
        let user = eligible_user("a@x.com");
        let credential = credential_for(&tokens, &user);
        // Account store has nobody in it
        let checkout = CheckoutService::with_stores(
            &tokens,
            FakeAccounts(HashMap::new()),
            FakeOrders::default(),
            TIMEOUT,
        );

        let result = checkout.place_order(Some(&credential), snapshot()).await;
        assert!(matches!(result, Err(CheckoutError::ProfileIncomplete)));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let tokens = tokens();
        let user = eligible_user("a@x.com");
        let credential = credential_for(&tokens, &user);
        let orders = FakeOrders::default();
        let checkout =
            CheckoutService::with_stores(&tokens, accounts_with(user), orders.clone(), TIMEOUT);

        let empty = CartSnapshot {
            items: Vec::new(),
            total_amount: Decimal::ZERO,
        };
        let result = checkout.place_order(Some(&credential), empty).await;

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(orders.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_absent_credential_is_unauthenticated() {
        let tokens = tokens();
        let checkout = CheckoutService::with_stores(
            &tokens,
            FakeAccounts(HashMap::new()),
            FakeOrders::default(),
            TIMEOUT,
        );

        let result = checkout.place_order(None, snapshot()).await;
        assert!(matches!(result, Err(CheckoutError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_garbage_credential_is_unauthenticated() {
        let tokens = tokens();
        let user = eligible_user("a@x.com");
        let checkout = CheckoutService::with_stores(
            &tokens,
            accounts_with(user),
            FakeOrders::default(),
            TIMEOUT,
        );

        let result = checkout.place_order(Some("not-a-token"), snapshot()).await;
        assert!(matches!(result, Err(CheckoutError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_failing_order_store_is_store_unavailable() {
        let tokens = tokens();
        let user = eligible_user("a@x.com");
        let credential = credential_for(&tokens, &user);
        let checkout =
            CheckoutService::with_stores(&tokens, accounts_with(user), FailingOrders, TIMEOUT);

        let result = checkout.place_order(Some(&credential), snapshot()).await;
        assert!(matches!(result, Err(CheckoutError::StoreUnavailable)));
    }

    #[tokio::test]
    async fn test_store_timeout_is_store_unavailable() {
        let tokens = tokens();
        let user = eligible_user("a@x.com");
        let credential = credential_for(&tokens, &user);
        let checkout = CheckoutService::with_stores(
            &tokens,
            HangingAccounts,
            FakeOrders::default(),
            Duration::from_millis(10),
        );

        let result = checkout.place_order(Some(&credential), snapshot()).await;
        assert!(matches!(result, Err(CheckoutError::StoreUnavailable)));
    }

    #[tokio::test]
    async fn test_address_edits_never_alter_past_orders() {
        let tokens = tokens();
        let user = eligible_user("a@x.com");
        let credential = credential_for(&tokens, &user);
        let orders = FakeOrders::default();
        let checkout =
            CheckoutService::with_stores(&tokens, accounts_with(user), orders.clone(), TIMEOUT);

        let order = checkout
            .place_order(Some(&credential), snapshot())
            .await
            .unwrap();

        // The persisted draft carries its own frozen copy of the address,
        // not a live reference to the account record
        let inserted = orders.inserted.lock().unwrap();
        let draft = inserted.first().unwrap();
        assert_eq!(draft.shipping_address, order.shipping_address);
        assert_eq!(draft.shipping_address.city, "Pune");
    }
}
