//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! order-desk cart add 12 --quantity 3
//! order-desk cart remove 12
//! order-desk cart set 12 5
//! order-desk cart show
//! order-desk cart clear
//! ```

use order_desk_client::ApiError;
use order_desk_core::catalog::StockError;
use order_desk_core::format_rupees;
use thiserror::Error;

use super::Context;

/// Errors that can occur while editing the cart.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// The product could not be looked up.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Not enough stock.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// The product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),
}

/// Add `quantity` units of a catalog product.
pub async fn add(ctx: &Context, product_id: &str, quantity: u32) -> Result<(), CartCommandError> {
    let product = ctx.client.product(product_id).await?;
    let mut cart = ctx.cart();

    let mut current = cart.add_product(&product)?;
    if quantity > 1 {
        let target = i64::from(current) + i64::from(quantity) - 1;
        current = cart
            .set_quantity_within_stock(&product, target)
            .unwrap_or(current);
    }

    tracing::info!(
        "Added {} ({}) - {} in cart, cart total {}",
        product.name,
        product.unit_price,
        current,
        format_rupees(cart.total())
    );
    Ok(())
}

/// Remove one unit, or the whole line with `all`.
pub fn remove(ctx: &Context, product_id: &str, all: bool) -> Result<(), CartCommandError> {
    let mut cart = ctx.cart();

    let remaining = if all {
        cart.remove_line(product_id).map(|_| 0)
    } else {
        cart.remove(product_id)
    };
    let remaining = remaining.ok_or_else(|| CartCommandError::NotInCart(product_id.to_owned()))?;

    if remaining == 0 {
        tracing::info!("Removed {product_id} from the cart");
    } else {
        tracing::info!("{product_id}: {remaining} left in cart");
    }
    Ok(())
}

/// Overwrite the quantity of a product already in the cart.
///
/// The quantity is clamped to the product's stock when the catalog is
/// reachable; otherwise it is stored as given.
pub async fn set(ctx: &Context, product_id: &str, quantity: i64) -> Result<(), CartCommandError> {
    let mut cart = ctx.cart();
    if cart.cart().get(product_id).is_none() {
        return Err(CartCommandError::NotInCart(product_id.to_owned()));
    }

    let stored = match ctx.client.product(product_id).await {
        Ok(product) => cart.set_quantity_within_stock(&product, quantity),
        Err(e) => {
            tracing::warn!(error = %e, "Could not check stock, setting quantity as given");
            cart.set_quantity(product_id, quantity)
        }
    };

    match stored {
        Some(0) | None => tracing::info!("Removed {product_id} from the cart"),
        Some(quantity) => tracing::info!("{product_id}: quantity set to {quantity}"),
    }
    Ok(())
}

/// Print every cart line and the total.
pub fn show(ctx: &Context) {
    let store = ctx.cart();
    let cart = store.cart();

    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for line in cart.lines() {
        tracing::info!(
            "{:>6}  {:<32} {:>4} × {:>10} = {:>12}",
            line.product_id,
            line.name,
            line.quantity,
            line.unit_price.to_string(),
            format_rupees(line.line_total())
        );
    }
    tracing::info!(
        "{} items in {} lines, total {}",
        cart.item_count(),
        cart.len(),
        format_rupees(cart.total())
    );
}

/// Empty the cart.
pub fn clear(ctx: &Context) {
    ctx.cart().clear();
    tracing::info!("Cart cleared");
}
