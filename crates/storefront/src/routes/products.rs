//! Catalog route handlers.
//!
//! Read-through lookups over the in-memory catalog; no database involved.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use petalcart_core::ProductId;

use crate::catalog::Product;
use crate::error::AppError;
use crate::state::AppState;

/// Product detail: the catalog record plus the rendered long-form
/// description, when one exists.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description_html: Option<String>,
}

/// List all products.
pub async fn index(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog().all().to_vec())
}

/// Product detail by ID.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>, AppError> {
    let id = ProductId::new(id);

    let product = state
        .catalog()
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let long_description_html = state.catalog().description_html(&id).map(str::to_owned);

    Ok(Json(ProductDetail {
        product,
        long_description_html,
    }))
}
