//! Cart cache and reconciliation.
//!
//! The cache is the fast presentation truth for cart contents, keyed by the
//! owning identity's email. Every mutation is applied to the cache
//! synchronously and then mirrored into the account record by a
//! fire-and-forget background write. Mirror failures are logged and never
//! surfaced or rolled back - the account-side copy is advisory, and cart
//! contents only become authoritative inside the checkout transaction
//! (which re-derives price-independent data from the account, not from here).
//!
//! There is no read-your-writes guarantee against the mirror, only against
//! the cache itself. Entries expire after the configured TTL, which bounds
//! how stale an abandoned cart can get.

use std::time::Duration;

use sqlx::PgPool;

use petalcart_core::Email;

use crate::catalog::Product;
use crate::db::users::UserRepository;
use crate::models::cart::{Cart, CartItem};
use crate::models::user::ProfileUpdate;

/// Identity-keyed cart cache with an asynchronous account-store mirror.
#[derive(Clone)]
pub struct CartCache {
    pool: PgPool,
    entries: moka::future::Cache<Email, Cart>,
}

impl CartCache {
    /// Create a cart cache.
    ///
    /// `ttl` is the staleness bound: entries untouched for this long are
    /// evicted and the next read sees an empty cart.
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        let entries = moka::future::Cache::builder().time_to_live(ttl).build();

        Self { pool, entries }
    }

    /// Current cart for an identity (empty if absent or expired).
    pub async fn get(&self, email: &Email) -> Cart {
        self.entries.get(email).await.unwrap_or_default()
    }

    /// Add a product to an identity's cart.
    ///
    /// Applied to the cache synchronously; the updated snapshot is then
    /// mirrored to the account store in the background.
    pub async fn add(&self, email: &Email, product: Product, quantity: u32) -> Cart {
        let mut cart = self.get(email).await;
        cart.add(product, quantity);

        self.entries.insert(email.clone(), cart.clone()).await;
        self.mirror(email.clone(), cart.items.clone());

        cart
    }

    /// Empty an identity's cart, mirroring the empty snapshot.
    pub async fn clear(&self, email: &Email) -> Cart {
        let cart = Cart::default();

        self.entries.insert(email.clone(), cart.clone()).await;
        self.mirror(email.clone(), Vec::new());

        cart
    }

    /// Replace the cached cart with a client-supplied snapshot.
    ///
    /// Used when the profile-update endpoint receives a `cart` field: the
    /// account store was just written directly, so only the cache needs
    /// refreshing (no mirror write).
    pub async fn replace(&self, email: &Email, items: Vec<CartItem>) -> Cart {
        let cart = Cart { items };
        self.entries.insert(email.clone(), cart.clone()).await;
        cart
    }

    /// Drop an identity's cached cart without touching the mirror.
    ///
    /// This is the explicit invalidation signal fired on logout and on
    /// checkout success.
    pub async fn invalidate(&self, email: &Email) {
        self.entries.invalidate(email).await;
    }

    /// Fire-and-forget mirror write of a cart snapshot to the account store.
    fn mirror(&self, email: Email, items: Vec<CartItem>) {
        let pool = self.pool.clone();

        tokio::spawn(async move {
            let users = UserRepository::new(&pool);
            match users
                .update_profile(&email, ProfileUpdate::cart_only(items))
                .await
            {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::debug!(email = %email, "cart mirror skipped: no such account");
                }
                Err(e) => {
                    tracing::warn!(email = %email, "cart mirror write failed: {e}");
                }
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Availability;
    use petalcart_core::ProductId;
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    /// Lazy pool that never actually connects - mirror writes fail in the
    /// background (and are logged), which is exactly the contract: cache
    /// behavior must be unaffected.
    fn cache() -> CartCache {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/petalcart_test")
            .unwrap();
        CartCache::new(pool, Duration::from_secs(60))
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "pooja".to_owned(),
            price: Decimal::from(100),
            discount: Decimal::from(10),
            availability: Availability::Anytime,
            quantity_unit: "bunch".to_owned(),
            images: Vec::new(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_absent_cart_is_empty() {
        let carts = cache();
        assert!(carts.get(&email("a@x.com")).await.is_empty());
    }

    #[tokio::test]
    async fn test_add_accumulates_in_cache() {
        let carts = cache();
        let who = email("a@x.com");

        carts.add(&who, product("p1"), 2).await;
        let cart = carts.add(&who, product("p1"), 3).await;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().quantity, 5);

        // Read-your-writes against the cache
        let read_back = carts.get(&who).await;
        assert_eq!(read_back.item_count(), 5);
    }

    #[tokio::test]
    async fn test_carts_are_isolated_per_identity() {
        let carts = cache();
        carts.add(&email("a@x.com"), product("p1"), 1).await;

        assert!(carts.get(&email("b@x.com")).await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_cart() {
        let carts = cache();
        let who = email("a@x.com");

        carts.add(&who, product("p1"), 2).await;
        carts.clear(&who).await;

        assert!(carts.get(&who).await.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_evicts_entry() {
        let carts = cache();
        let who = email("a@x.com");

        carts.add(&who, product("p1"), 2).await;
        carts.invalidate(&who).await;

        assert!(carts.get(&who).await.is_empty());
    }

    #[tokio::test]
    async fn test_replace_overwrites_snapshot() {
        let carts = cache();
        let who = email("a@x.com");

        carts.add(&who, product("p1"), 2).await;
        let cart = carts
            .replace(
                &who,
                vec![CartItem {
                    product: product("p2"),
                    quantity: 1,
                }],
            )
            .await;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().product.id, ProductId::new("p2"));
    }
}
