//! Product catalog loaded from fixture files.
//!
//! The catalog is a read-through collaborator with no invariants of its own:
//! products come from `data/products.json` and optional long-form markdown
//! descriptions from `data/descriptions/<id>.md`, both loaded into memory at
//! startup. Markdown is rendered to HTML once at load time.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use comrak::{Options, markdown_to_html};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use petalcart_core::ProductId;

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog io error: {0}")]
    Io(String),
    #[error("catalog parse error: {0}")]
    Parse(String),
}

/// Product delivery window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Deliverable around the clock.
    #[serde(rename = "24hr")]
    TwentyFourHour,
    Anytime,
    Evening,
    Morning,
}

/// A catalog product.
///
/// Wire casing matches the fixture file and client payloads (`quantityUnit`).
/// Prices and discount percentages are decimals serialized as JSON numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Discount in percent (0-100).
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    pub availability: Availability,
    pub quantity_unit: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// In-memory product catalog.
///
/// Cheaply cloneable; the loaded data is shared behind `Arc`.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: Arc<Vec<Product>>,
    by_id: Arc<HashMap<ProductId, usize>>,
    descriptions: Arc<HashMap<ProductId, String>>,
}

impl ProductCatalog {
    /// Load the catalog from the data directory.
    ///
    /// A missing `products.json` yields an empty catalog (the seed command
    /// creates it); a malformed one is an error. Description files are
    /// optional per product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the fixture file exists but cannot be read
    /// or parsed.
    pub fn load(data_dir: &Path) -> Result<Self, CatalogError> {
        let products = Self::load_products(&data_dir.join("products.json"))?;
        let descriptions = Self::load_descriptions(&data_dir.join("descriptions"), &products);

        let by_id = products
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id.clone(), idx))
            .collect();

        Ok(Self {
            products: Arc::new(products),
            by_id: Arc::new(by_id),
            descriptions: Arc::new(descriptions),
        })
    }

    fn load_products(path: &Path) -> Result<Vec<Product>, CatalogError> {
        if !path.exists() {
            tracing::warn!("Catalog fixture does not exist: {:?}", path);
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        let products: Vec<Product> =
            serde_json::from_str(&raw).map_err(|e| CatalogError::Parse(e.to_string()))?;

        tracing::info!("Loaded {} catalog products", products.len());
        Ok(products)
    }

    /// Load and render markdown descriptions for the given products.
    ///
    /// Load failures are logged and skipped so a single bad file never takes
    /// the storefront down.
    fn load_descriptions(dir: &Path, products: &[Product]) -> HashMap<ProductId, String> {
        let mut descriptions = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Descriptions directory does not exist: {:?}", dir);
            return descriptions;
        }

        for product in products {
            let path = dir.join(format!("{}.md", product.id));
            if !path.exists() {
                continue;
            }

            match std::fs::read_to_string(&path) {
                Ok(markdown) => {
                    let html = markdown_to_html(&markdown, &Options::default());
                    descriptions.insert(product.id.clone(), html);
                }
                Err(e) => {
                    tracing::error!("Failed to read description {:?}: {e}", path);
                }
            }
        }

        tracing::info!("Loaded {} product descriptions", descriptions.len());
        descriptions
    }

    /// All products, in fixture order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.by_id.get(id).and_then(|&idx| self.products.get(idx))
    }

    /// Rendered HTML description for a product, if one exists.
    #[must_use]
    pub fn description_html(&self, id: &ProductId) -> Option<&str> {
        self.descriptions.get(id).map(String::as_str)
    }
}
