//! Checkout command.

use chrono::Local;
use order_desk_client::checkout::{SubmitError, submit};
use order_desk_core::checkout::CheckoutForm;
use order_desk_core::format_rupees;

use super::Context;

/// Place an order for the persisted cart.
///
/// On failure the cart is kept so the order can be retried.
pub async fn place_order(ctx: &Context, form: &CheckoutForm) -> Result<(), SubmitError> {
    let mut cart = ctx.cart();
    let today = Local::now().date_naive();

    let receipt = submit(&ctx.client, &mut cart, form, today).await?;

    match &receipt.order_id {
        Some(order_id) => tracing::info!("Order {order_id} placed"),
        None => tracing::info!("Order placed"),
    }
    tracing::info!(
        "{} items, total {}, delivery on {}",
        receipt.items,
        format_rupees(receipt.total),
        receipt.delivery_date.format("%Y-%m-%d")
    );
    Ok(())
}
