//! Shopping cart model and persisted store.
//!
//! A [`Cart`] maps each product ID to a single [`CartLine`]. The
//! [`CartStore`] owns a cart, writes it back to a [`KeyValueStore`] after
//! every mutation and notifies subscribers.
//!
//! # Invariants
//!
//! - One line per product ID.
//! - A line's quantity is always at least 1; a line that would drop to 0 is
//!   removed instead.

mod storage;
mod store;

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, UnitPrice};

pub use storage::{KeyValueStore, MemoryStore};
pub use store::{
    CART_STORAGE_KEY, CartEvent, CartStore, LEGACY_CART_STORAGE_KEY, SubscriptionId,
};

/// One product's entry in the cart.
///
/// Field names on the wire match the blob the web storefront kept in
/// local storage, so existing carts load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: UnitPrice,
    #[serde(default)]
    pub category: String,
    pub quantity: u32,
}

impl CartLine {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

/// Mapping of product ID to cart line. Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: HashMap<ProductId, CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a line by product ID.
    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.get(product_id)
    }

    /// Quantity of a product in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.lines.get(product_id).map_or(0, |line| line.quantity)
    }

    /// Lines sorted by product ID for stable display.
    #[must_use]
    pub fn lines(&self) -> Vec<&CartLine> {
        let mut lines: Vec<&CartLine> = self.lines.values().collect();
        lines.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        lines
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.values().map(CartLine::line_total).sum()
    }

    pub(crate) fn lines_mut(&mut self) -> &mut HashMap<ProductId, CartLine> {
        &mut self.lines
    }

    /// Drop lines that violate the quantity invariant or whose key does not
    /// match the line's own product ID. Used on data loaded from storage.
    #[must_use]
    pub(crate) fn sanitized(mut self) -> Self {
        self.lines
            .retain(|key, line| line.quantity > 0 && *key == line.product_id);
        self
    }
}
