//! Order listing, export, detail and dashboard entry commands.
//!
//! # Usage
//!
//! ```bash
//! order-desk orders list --search andheri --status paid
//! order-desk orders list --date 2024-01-15 --export orders.csv
//! order-desk orders show ORD001
//! order-desk orders create --phone 9820012345 --item 1:2 --item 3:1:420
//! ```

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use order_desk_client::ApiError;
use order_desk_client::checkout::{EntrySubmitError, submit_entry};
use order_desk_client::export::{ExportError, export_orders_csv};
use order_desk_core::entry::OrderEntry;
use order_desk_core::orders::{Order, OrderFilter, OrderQuery, OrdersSummary};
use order_desk_core::{PaymentStatus, format_rupees};
use thiserror::Error;

use super::Context;

/// Errors that can occur while reviewing orders.
#[derive(Debug, Error)]
pub enum OrdersCommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Order {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Entry(#[from] EntrySubmitError),
}

/// Options for `orders list`.
pub struct ListOptions {
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub limit: Option<u32>,
    pub export: Option<PathBuf>,
}

/// List orders, filtered locally, with a summary line.
pub async fn list(ctx: &Context, options: ListOptions) -> Result<(), OrdersCommandError> {
    let query = OrderQuery {
        phone: options.phone,
        payment_status: options.status.clone(),
        from_date: None,
        limit: options.limit,
    };
    let fetched = ctx.client.orders_or_sample(&query).await;
    if fetched.is_sample() {
        tracing::warn!("API unavailable, showing sample orders");
    }

    let filter = OrderFilter {
        search: options.search,
        payment_status: options.status,
        date: options.date,
    };
    let orders = filter.apply(&fetched.data);

    if orders.is_empty() {
        tracing::info!("No orders found");
    }
    for order in &orders {
        print_row(order);
    }

    let summary = OrdersSummary::of(orders.iter().copied());
    tracing::info!(
        "{} orders, total {} ({} paid, {} unpaid)",
        summary.count,
        format_rupees(summary.total_amount),
        summary.paid,
        summary.unpaid
    );

    if let Some(path) = options.export {
        export_orders_csv(&path, &orders)?;
        tracing::info!("Exported {} orders to {}", orders.len(), path.display());
    }
    Ok(())
}

/// Show a single order with its items.
pub async fn show(ctx: &Context, order_id: &str) -> Result<(), OrdersCommandError> {
    let fetched = ctx.client.orders_or_sample(&OrderQuery::default()).await;
    if fetched.is_sample() {
        tracing::warn!("API unavailable, searching sample orders");
    }

    let order = fetched
        .data
        .iter()
        .find(|order| order.id.as_ref().is_some_and(|id| id.as_str() == order_id))
        .ok_or_else(|| OrdersCommandError::NotFound(order_id.to_owned()))?;

    tracing::info!("Order {order_id}");
    tracing::info!(
        "  Placed:    {} {}",
        order.order_date.as_deref().unwrap_or("-"),
        order.short_time()
    );
    tracing::info!(
        "  Customer:  {} ({})",
        order.customer_name.as_deref().unwrap_or("-"),
        order.phone.as_deref().unwrap_or("-")
    );
    tracing::info!(
        "  Address:   {}, {}",
        order.area.as_deref().unwrap_or("-"),
        order.city.as_deref().unwrap_or("-")
    );
    tracing::info!("  Delivery:  {}", order.delivery_date.as_deref().unwrap_or("-"));
    tracing::info!("  Payment:   {}", status_label(order));
    for item in &order.items {
        tracing::info!("    {} × {}", item.product_name, item.quantity.normalize());
    }
    tracing::info!("  Total:     {}", format_rupees(order.total_amount));
    Ok(())
}

/// Place a dashboard order.
pub async fn create(ctx: &Context, entry: &OrderEntry) -> Result<(), OrdersCommandError> {
    let today = Local::now().date_naive();
    let receipt = submit_entry(&ctx.client, entry, today).await?;

    match &receipt.order_id {
        Some(order_id) => tracing::info!("Order created successfully! Order ID: {order_id}"),
        None => tracing::info!("Order created successfully!"),
    }
    tracing::info!(
        "{} items, total {}, delivery on {}",
        receipt.items,
        format_rupees(receipt.total),
        receipt.delivery_date.format("%Y-%m-%d")
    );
    Ok(())
}

fn print_row(order: &Order) {
    tracing::info!(
        "{:<8} {} {:<5} {:<20} {:<12} {:<20} {:>12}  {}",
        order.id.as_ref().map_or("-", |id| id.as_str()),
        order.order_date.as_deref().unwrap_or("-"),
        order.short_time(),
        order.customer_name.as_deref().unwrap_or("-"),
        order.phone.as_deref().unwrap_or("-"),
        order.city.as_deref().unwrap_or("-"),
        format_rupees(order.total_amount),
        status_label(order)
    );
}

fn status_label(order: &Order) -> &str {
    order.payment_status.as_ref().map_or("Unknown", PaymentStatus::as_str)
}
