//! The persisted, observable cart.

use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{Cart, CartLine, KeyValueStore};
use crate::catalog::{Product, StockError};
use crate::types::{ProductId, UnitPrice};

/// Storage key holding the cart blob.
pub const CART_STORAGE_KEY: &str = "cart";

/// Key the checkout page used to hand the cart over. Read when
/// [`CART_STORAGE_KEY`] is absent, removed on [`CartStore::clear`].
pub const LEGACY_CART_STORAGE_KEY: &str = "checkout_cart";

/// A change to the cart, delivered to subscribers after it is persisted.
///
/// `quantity` is the product's quantity after the change; 0 means the line
/// is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    Added { product_id: ProductId, quantity: u32 },
    Removed { product_id: ProductId, quantity: u32 },
    QuantitySet { product_id: ProductId, quantity: u32 },
    Cleared,
}

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&CartEvent) + Send + Sync>;

/// An owned cart bound to a storage backend.
///
/// Every mutation writes the whole cart back to storage and then notifies
/// subscribers. Storage failures are logged and otherwise ignored: the
/// in-memory cart stays authoritative for the rest of the session.
pub struct CartStore<S: KeyValueStore> {
    cart: Cart,
    storage: S,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Load the cart persisted in `storage`.
    ///
    /// Falls back to the legacy key when the primary key is unset. Missing,
    /// unreadable or corrupt data yields an empty cart.
    pub fn load(storage: S) -> Self {
        let cart = read_cart(&storage);
        debug!(lines = cart.len(), "Cart loaded");
        Self {
            cart,
            storage,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the store, returning the storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Add one unit of a product, inserting a new line with quantity 1 if
    /// the product is not in the cart yet.
    ///
    /// Returns the new quantity.
    pub fn add(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: UnitPrice,
        category: impl Into<String>,
    ) -> u32 {
        let quantity = match self.cart.lines_mut().get_mut(&product_id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                line.quantity
            }
            None => {
                self.cart.lines_mut().insert(
                    product_id.clone(),
                    CartLine {
                        product_id: product_id.clone(),
                        name: name.into(),
                        unit_price,
                        category: category.into(),
                        quantity: 1,
                    },
                );
                1
            }
        };

        self.commit(&CartEvent::Added {
            product_id,
            quantity,
        });
        quantity
    }

    /// Add one unit of a catalog product, respecting its stock.
    ///
    /// # Errors
    ///
    /// Returns `StockError::OutOfStock` if the product has no stock, or
    /// `StockError::Exceeded` if the cart already holds all of it.
    pub fn add_product(&mut self, product: &Product) -> Result<u32, StockError> {
        if product.stock == 0 {
            return Err(StockError::OutOfStock(product.id.clone()));
        }
        let current = self.cart.quantity_of(product.id.as_str());
        if current >= product.stock {
            return Err(StockError::Exceeded {
                product_id: product.id.clone(),
                available: product.stock,
            });
        }
        Ok(self.add(
            product.id.clone(),
            product.name.clone(),
            product.unit_price,
            product.category.clone().unwrap_or_default(),
        ))
    }

    /// Remove one unit of a product, deleting the line when it reaches 0.
    ///
    /// Returns the remaining quantity, or `None` if the product was not in
    /// the cart.
    pub fn remove(&mut self, product_id: &str) -> Option<u32> {
        let line = self.cart.lines_mut().get_mut(product_id)?;
        let remaining = line.quantity.saturating_sub(1);
        let key = line.product_id.clone();
        if remaining == 0 {
            self.cart.lines_mut().remove(product_id);
        } else {
            line.quantity = remaining;
        }

        self.commit(&CartEvent::Removed {
            product_id: key,
            quantity: remaining,
        });
        Some(remaining)
    }

    /// Delete a product's line regardless of quantity.
    ///
    /// Returns the removed line, or `None` if the product was not in the
    /// cart.
    pub fn remove_line(&mut self, product_id: &str) -> Option<CartLine> {
        let line = self.cart.lines_mut().remove(product_id)?;
        self.commit(&CartEvent::Removed {
            product_id: line.product_id.clone(),
            quantity: 0,
        });
        Some(line)
    }

    /// Overwrite a product's quantity. A quantity of 0 or less deletes the
    /// line.
    ///
    /// Products not already in the cart are ignored (a line cannot be
    /// created without its name and price). Returns the resulting quantity,
    /// or `None` for a missing product.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> Option<u32> {
        if quantity <= 0 {
            return self.remove_line(product_id).map(|_| 0);
        }

        let line = self.cart.lines_mut().get_mut(product_id)?;
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        line.quantity = quantity;
        let key = line.product_id.clone();

        self.commit(&CartEvent::QuantitySet {
            product_id: key,
            quantity,
        });
        Some(quantity)
    }

    /// Set a catalog product's quantity, clamping to its stock.
    ///
    /// Returns the quantity actually stored, or `None` if the product is not
    /// in the cart and `quantity` is positive.
    pub fn set_quantity_within_stock(&mut self, product: &Product, quantity: i64) -> Option<u32> {
        let clamped = product.clamp_quantity(quantity);
        if i64::from(clamped) < quantity {
            warn!(
                product_id = %product.id,
                requested = quantity,
                available = product.stock,
                "Quantity limited to available stock"
            );
        }
        self.set_quantity(product.id.as_str(), i64::from(clamped))
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Empty the cart and persist the empty state.
    pub fn clear(&mut self) {
        self.cart = Cart::new();
        if let Err(e) = self.storage.remove(LEGACY_CART_STORAGE_KEY) {
            warn!(error = %e, "Failed to remove legacy cart key");
        }
        self.commit(&CartEvent::Cleared);
    }

    /// Write the cart to storage.
    ///
    /// Failures are logged and swallowed; see the type-level docs.
    pub fn save(&mut self) {
        let blob = match serde_json::to_string(&self.cart) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.storage.set(CART_STORAGE_KEY, &blob) {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    /// Register a listener for cart changes.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&CartEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn commit(&mut self, event: &CartEvent) {
        self.save();
        debug!(?event, "Cart updated");
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }
}

fn read_cart<S: KeyValueStore>(storage: &S) -> Cart {
    for key in [CART_STORAGE_KEY, LEGACY_CART_STORAGE_KEY] {
        match storage.get(key) {
            Ok(Some(blob)) => {
                return serde_json::from_str::<Cart>(&blob).map_or_else(
                    |e| {
                        warn!(key, error = %e, "Stored cart is corrupt, starting empty");
                        Cart::new()
                    },
                    Cart::sanitized,
                );
            }
            Ok(None) => {}
            Err(e) => {
                warn!(key, error = %e, "Failed to read stored cart, starting empty");
                return Cart::new();
            }
        }
    }
    Cart::new()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::cart::MemoryStore;

    fn price(rupees: u32) -> UnitPrice {
        UnitPrice::from_rupees(rupees)
    }

    fn store() -> CartStore<MemoryStore> {
        CartStore::load(MemoryStore::new())
    }

    fn product(id: &str, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: price(100),
            stock,
            description: None,
            category: Some("Hamper".to_string()),
        }
    }

    /// Storage whose writes always fail.
    #[derive(Default)]
    struct BrokenStore;

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    impl KeyValueStore for BrokenStore {
        type Error = DiskFull;

        fn get(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(DiskFull)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err(DiskFull)
        }

        fn remove(&mut self, _key: &str) -> Result<(), Self::Error> {
            Err(DiskFull)
        }
    }

    #[test]
    fn test_add_same_product_twice() {
        let mut store = store();
        store.add(ProductId::new("p1"), "A", price(100), "X");
        let quantity = store.add(ProductId::new("p1"), "A", price(100), "X");
        assert_eq!(quantity, 2);
        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.total(), Decimal::from(200));
    }

    #[test]
    fn test_total_over_multiple_lines() {
        let mut store = store();
        store.add(ProductId::new("p1"), "A", price(50), "X");
        store.add(ProductId::new("p1"), "A", price(50), "X");
        store.add(ProductId::new("p2"), "B", price(30), "Y");
        assert_eq!(store.total(), Decimal::from(130));
    }

    #[test]
    fn test_remove_decrements_then_deletes() {
        let mut store = store();
        store.add(ProductId::new("p1"), "A", price(10), "X");
        store.add(ProductId::new("p1"), "A", price(10), "X");
        assert_eq!(store.remove("p1"), Some(1));
        assert_eq!(store.cart().quantity_of("p1"), 1);
        assert_eq!(store.remove("p1"), Some(0));
        assert!(store.cart().get("p1").is_none());
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = store();
        assert_eq!(store.remove("nope"), None);
        assert_eq!(store.remove_line("nope"), None);
        assert_eq!(store.set_quantity("nope", 3), None);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut store = store();
        store.add(ProductId::new("p1"), "A", price(10), "X");
        assert_eq!(store.set_quantity("p1", 5), Some(5));
        assert_eq!(store.total(), Decimal::from(50));
    }

    #[test]
    fn test_set_quantity_zero_matches_remove() {
        let mut via_set = store();
        let mut via_remove = store();
        for s in [&mut via_set, &mut via_remove] {
            s.add(ProductId::new("p1"), "A", price(10), "X");
            s.add(ProductId::new("p2"), "B", price(20), "X");
        }
        via_set.set_quantity("p1", 0);
        via_remove.remove("p1");
        assert_eq!(via_set.cart(), via_remove.cart());
    }

    #[test]
    fn test_set_quantity_negative_deletes() {
        let mut store = store();
        store.add(ProductId::new("p1"), "A", price(10), "X");
        assert_eq!(store.set_quantity("p1", -4), Some(0));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(store().total(), Decimal::ZERO);
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let mut store = store();
        store.add(ProductId::new("p1"), "A", price(50), "X");
        store.add(ProductId::new("p1"), "A", price(50), "X");
        store.add(ProductId::new("p2"), "B", price(30), "Y");
        let expected = store.cart().clone();

        let reloaded = CartStore::load(store.into_storage());
        assert_eq!(reloaded.cart(), &expected);
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let mut store = store();
        store.add(ProductId::new("p1"), "A", price(50), "X");
        store.clear();
        assert!(store.cart().is_empty());

        let blob = store.storage().get(CART_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(blob, "{}");
        assert!(CartStore::load(store.into_storage()).cart().is_empty());
    }

    #[test]
    fn test_loads_legacy_key_when_primary_missing() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                LEGACY_CART_STORAGE_KEY,
                r#"{"p9": {"id": "p9", "name": "Gift", "price": 250, "category": "Box", "quantity": 2}}"#,
            )
            .unwrap();
        let store = CartStore::load(storage);
        assert_eq!(store.cart().quantity_of("p9"), 2);
        assert_eq!(store.total(), Decimal::from(500));
    }

    #[test]
    fn test_primary_key_wins_over_legacy() {
        let mut storage = MemoryStore::new();
        storage.set(CART_STORAGE_KEY, "{}").unwrap();
        storage
            .set(
                LEGACY_CART_STORAGE_KEY,
                r#"{"p9": {"id": "p9", "name": "Gift", "price": 250, "quantity": 2}}"#,
            )
            .unwrap();
        assert!(CartStore::load(storage).cart().is_empty());
    }

    #[test]
    fn test_clear_removes_legacy_key() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                LEGACY_CART_STORAGE_KEY,
                r#"{"p9": {"id": "p9", "name": "Gift", "price": 250, "quantity": 2}}"#,
            )
            .unwrap();
        let mut store = CartStore::load(storage);
        store.clear();
        assert!(store.storage().get(LEGACY_CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let mut storage = MemoryStore::new();
        storage.set(CART_STORAGE_KEY, "{not json").unwrap();
        assert!(CartStore::load(storage).cart().is_empty());
    }

    #[test]
    fn test_zero_quantity_lines_dropped_on_load() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                CART_STORAGE_KEY,
                r#"{"p1": {"id": "p1", "name": "A", "price": 10, "quantity": 0}}"#,
            )
            .unwrap();
        assert!(CartStore::load(storage).cart().is_empty());
    }

    #[test]
    fn test_storage_failures_do_not_surface() {
        let mut store = CartStore::load(BrokenStore);
        assert!(store.cart().is_empty());
        store.add(ProductId::new("p1"), "A", price(10), "X");
        store.clear();
        store.add(ProductId::new("p1"), "A", price(10), "X");
        assert_eq!(store.cart().quantity_of("p1"), 1);
    }

    #[test]
    fn test_listeners_receive_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut store = store();
        store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        store.add(ProductId::new("p1"), "A", price(10), "X");
        store.add(ProductId::new("p1"), "A", price(10), "X");
        store.remove("p1");
        store.remove("missing");
        store.set_quantity("p1", 4);
        store.set_quantity("p1", 0);
        store.clear();

        let events = events.lock().unwrap();
        let p1 = ProductId::new("p1");
        assert_eq!(
            *events,
            vec![
                CartEvent::Added { product_id: p1.clone(), quantity: 1 },
                CartEvent::Added { product_id: p1.clone(), quantity: 2 },
                CartEvent::Removed { product_id: p1.clone(), quantity: 1 },
                CartEvent::QuantitySet { product_id: p1.clone(), quantity: 4 },
                CartEvent::Removed { product_id: p1, quantity: 0 },
                CartEvent::Cleared,
            ]
        );
    }

    #[test]
    fn test_unsubscribe_stops_events() {
        let count = Arc::new(Mutex::new(0_u32));
        let sink = Arc::clone(&count);
        let mut store = store();
        let id = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.add(ProductId::new("p1"), "A", price(10), "X");
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add(ProductId::new("p1"), "A", price(10), "X");

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_add_product_respects_stock() {
        let mut store = store();
        assert_eq!(
            store.add_product(&product("p1", 0)),
            Err(StockError::OutOfStock(ProductId::new("p1")))
        );

        let limited = product("p2", 2);
        assert_eq!(store.add_product(&limited), Ok(1));
        assert_eq!(store.add_product(&limited), Ok(2));
        assert_eq!(
            store.add_product(&limited),
            Err(StockError::Exceeded {
                product_id: ProductId::new("p2"),
                available: 2
            })
        );
        assert_eq!(store.cart().get("p2").unwrap().category, "Hamper");
    }

    #[test]
    fn test_set_quantity_within_stock_clamps() {
        let mut store = store();
        let limited = product("p1", 3);
        store.add_product(&limited).unwrap();
        assert_eq!(store.set_quantity_within_stock(&limited, 10), Some(3));
        assert_eq!(store.set_quantity_within_stock(&limited, -1), Some(0));
    }
}
