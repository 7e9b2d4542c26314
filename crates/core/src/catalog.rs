//! Products as served by the catalog endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductId, UnitPrice};

/// A product offered by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "ProductID")]
    pub id: ProductId,
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "UniPrice")]
    pub unit_price: UnitPrice,
    #[serde(rename = "Stock", default, deserialize_with = "crate::wire::null_as_default")]
    pub stock: u32,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
}

impl Product {
    /// Whether any units can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Clamp a requested quantity to `0..=stock`.
    #[must_use]
    pub fn clamp_quantity(&self, requested: i64) -> u32 {
        u32::try_from(requested.clamp(0, i64::from(self.stock))).unwrap_or(0)
    }
}

/// Products bucketed under their category name.
pub type ProductsByCategory = BTreeMap<String, Vec<Product>>;

/// Find a product by ID across all categories.
#[must_use]
pub fn find_in_groups<'a>(groups: &'a ProductsByCategory, product_id: &str) -> Option<(&'a str, &'a Product)> {
    groups.iter().find_map(|(category, products)| {
        products
            .iter()
            .find(|product| product.id.as_str() == product_id)
            .map(|product| (category.as_str(), product))
    })
}

/// Stock violations when adding catalog products to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// The product has no stock at all.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// The cart already holds every available unit.
    #[error("only {available} of product {product_id} available")]
    Exceeded { product_id: ProductId, available: u32 },
}
