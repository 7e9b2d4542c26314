//! Cache types for catalog responses.

use order_desk_core::catalog::{Product, ProductsByCategory};

/// Cache keys.
pub const PRODUCTS: &str = "products";
pub const PRODUCTS_BY_CATEGORY: &str = "products:grouped";
pub const CATEGORIES: &str = "categories";
pub const CITIES: &str = "cities";

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    ProductsByCategory(ProductsByCategory),
    Names(Vec<String>),
}
