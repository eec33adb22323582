//! Cart domain types and the advisory total computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// One cart line: a product snapshot plus a quantity.
///
/// The product fields are flattened so the wire shape matches the client
/// payload (product fields at the top level, `quantity` alongside them).
/// Quantities below 1 are rejected at the route boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price after the product discount is applied.
    #[must_use]
    pub fn discounted_unit_price(&self) -> Decimal {
        self.product.price * (Decimal::ONE - self.product.discount / Decimal::from(100))
    }

    /// Line total (discounted unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.discounted_unit_price() * Decimal::from(self.quantity)
    }
}

/// A shopping cart: an insertion-ordered collection of lines, unique per
/// product ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Add a product to the cart.
    ///
    /// If the product is already present its quantity is increased by the
    /// requested amount; otherwise a new line is appended. No upper bound is
    /// enforced here.
    pub fn add(&mut self, product: Product, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.quantity += quantity;
        } else {
            self.items.push(CartItem { product, quantity });
        }
    }

    /// Advisory cart total, rounded to 2 decimal places.
    ///
    /// This value is for display; checkout accepts the client-submitted total
    /// rather than recomputing (the server substitutes only the address).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .sum::<Decimal>()
            .round_dp(2)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Availability;
    use petalcart_core::ProductId;

    fn product(id: &str, price: i64, discount: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "pooja".to_owned(),
            price: Decimal::from(price),
            discount: Decimal::from(discount),
            availability: Availability::Anytime,
            quantity_unit: "bunch".to_owned(),
            images: Vec::new(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_add_accumulates_quantity() {
        let mut cart = Cart::default();
        cart.add(product("p1", 100, 0), 2);
        cart.add(product("p1", 100, 0), 3);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().quantity, 5);
    }

    #[test]
    fn test_add_distinct_products_append() {
        let mut cart = Cart::default();
        cart.add(product("p1", 100, 0), 1);
        cart.add(product("p2", 50, 0), 1);

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_total_applies_discount() {
        // price 100, discount 10%, qty 2 -> 90 * 2 = 180.00
        let mut cart = Cart::default();
        cart.add(product("p1", 100, 10), 2);

        assert_eq!(cart.total(), Decimal::new(18000, 2));
    }

    #[test]
    fn test_total_is_idempotent() {
        let mut cart = Cart::default();
        cart.add(product("p1", 33, 7), 3);
        cart.add(product("p2", 15, 0), 1);

        let first = cart.total();
        let second = cart.total();
        assert_eq!(first, second);
        assert_eq!(first, first.round_dp(2));
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
