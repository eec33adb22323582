//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::{CatalogError, ProductCatalog};
use crate::config::StorefrontConfig;
use crate::services::cart::CartCache;
use crate::services::token::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: ProductCatalog,
    tokens: TokenService,
    carts: CartCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Loads the product catalog from `config.data_dir` and wires the token
    /// service and cart cache from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog fixtures cannot be loaded.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, CatalogError> {
        let catalog = ProductCatalog::load(&config.data_dir)?;
        let tokens = TokenService::new(&config.token_secret);
        let carts = CartCache::new(pool.clone(), config.cart_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                tokens,
                carts,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.inner.catalog
    }

    /// Get a reference to the session token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the cart cache.
    #[must_use]
    pub fn carts(&self) -> &CartCache {
        &self.inner.carts
    }
}
