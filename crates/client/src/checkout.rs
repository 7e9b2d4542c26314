//! Order submission from the cart and from dashboard entry.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use order_desk_core::OrderId;
use order_desk_core::cart::{CartStore, KeyValueStore};
use order_desk_core::checkout::{CheckoutError, CheckoutForm, OrderRequest};
use order_desk_core::entry::{EntryError, OrderEntry};

use crate::api::{ApiClient, ApiError};

/// Why an order was not placed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] CheckoutError),

    #[error("Failed to place order: {0}")]
    Api(#[from] ApiError),
}

/// Why a dashboard entry was not placed.
#[derive(Debug, Error)]
pub enum EntrySubmitError {
    #[error(transparent)]
    Invalid(#[from] EntryError),

    #[error("Failed to place order: {0}")]
    Api(#[from] ApiError),
}

/// What the desk knows about a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    /// ID assigned by the API, when it reported one.
    pub order_id: Option<OrderId>,
    pub total: Decimal,
    pub items: usize,
    pub delivery_date: NaiveDate,
}

impl OrderReceipt {
    fn new(order_id: Option<OrderId>, order: &OrderRequest) -> Self {
        Self {
            order_id,
            total: order.total(),
            items: order.items.len(),
            delivery_date: order.delivery_date,
        }
    }
}

/// Validate `form` against the cart, post the order and clear the cart.
///
/// The cart is left untouched unless the API accepts the order.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` for form or cart problems (nothing is
/// sent) and `SubmitError::Api` if the API rejects or cannot be reached.
#[instrument(skip_all, fields(city = %form.city))]
pub async fn submit<S: KeyValueStore>(
    client: &ApiClient,
    cart: &mut CartStore<S>,
    form: &CheckoutForm,
    today: NaiveDate,
) -> Result<OrderReceipt, SubmitError> {
    let order = form.build_order(cart.cart(), today)?;

    let order_id = match client.create_order(&order).await {
        Ok(order_id) => order_id,
        Err(e) => {
            warn!(error = %e, "Order submission failed, keeping cart");
            return Err(e.into());
        }
    };

    let receipt = OrderReceipt::new(order_id, &order);
    cart.clear();

    info!(
        order_id = receipt.order_id.as_ref().map_or("-", OrderId::as_str),
        total = %receipt.total,
        "Order placed"
    );
    Ok(receipt)
}

/// Build a dashboard entry against the catalog and post it.
///
/// # Errors
///
/// Returns `EntrySubmitError::Invalid` when the entry is incomplete or
/// names an unknown product (nothing is posted), and
/// `EntrySubmitError::Api` if the catalog or the order call fails.
#[instrument(skip_all, fields(items = entry.items.len()))]
pub async fn submit_entry(
    client: &ApiClient,
    entry: &OrderEntry,
    today: NaiveDate,
) -> Result<OrderReceipt, EntrySubmitError> {
    let catalog = client.products_by_category().await?;
    let order = entry.build_order(&catalog, today)?;

    let order_id = client.create_order(&order).await?;
    let receipt = OrderReceipt::new(order_id, &order);

    info!(
        order_id = receipt.order_id.as_ref().map_or("-", OrderId::as_str),
        total = %receipt.total,
        "Dashboard order placed"
    );
    Ok(receipt)
}
