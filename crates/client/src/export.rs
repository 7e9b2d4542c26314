//! CSV export of order listings and the text statistics report.

use std::io;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use order_desk_core::orders::Order;
use order_desk_core::stats::Stats;

/// Column headers of the export, in order.
pub const CSV_HEADERS: [&str; 10] = [
    "Order ID",
    "Date",
    "Time",
    "Customer Name",
    "Phone",
    "City",
    "Area",
    "Total Amount",
    "Payment Status",
    "Delivery Date",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Serialize)]
struct OrderRow<'a> {
    id: &'a str,
    date: &'a str,
    time: &'a str,
    customer_name: &'a str,
    phone: &'a str,
    city: &'a str,
    area: &'a str,
    total_amount: String,
    payment_status: &'a str,
    delivery_date: &'a str,
}

impl<'a> From<&'a Order> for OrderRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            id: order.id.as_ref().map_or("", |id| id.as_str()),
            date: order.order_date.as_deref().unwrap_or_default(),
            time: order.short_time(),
            customer_name: order.customer_name.as_deref().unwrap_or_default(),
            phone: order.phone.as_deref().unwrap_or_default(),
            city: order.city.as_deref().unwrap_or_default(),
            area: order.area.as_deref().unwrap_or_default(),
            total_amount: order.total_amount.round_dp(2).to_string(),
            payment_status: order.payment_status.as_ref().map_or("", |s| s.as_str()),
            delivery_date: order.delivery_date.as_deref().unwrap_or_default(),
        }
    }
}

/// Write `orders` as CSV, header row first.
///
/// # Errors
///
/// Returns `ExportError` if writing fails.
pub fn write_orders_csv<W: io::Write>(writer: W, orders: &[&Order]) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(CSV_HEADERS)?;
    for order in orders {
        wtr.serialize(OrderRow::from(*order))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `orders` to a CSV file at `path`.
///
/// # Errors
///
/// Returns `ExportError` if the file cannot be created or written.
pub fn export_orders_csv(path: &Path, orders: &[&Order]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_orders_csv(io::BufWriter::new(file), orders)?;
    info!(path = %path.display(), rows = orders.len(), "Exported orders");
    Ok(())
}

/// Write the statistics report for `stats` to `path`.
///
/// # Errors
///
/// Returns `ExportError::Io` if the file cannot be written.
pub fn export_stats_report(path: &Path, stats: &Stats, generated_on: NaiveDate) -> Result<(), ExportError> {
    std::fs::write(path, stats.report(generated_on))?;
    info!(path = %path.display(), "Exported statistics report");
    Ok(())
}
