//! Dashboard statistics and connection status.

use std::path::Path;

use chrono::Local;
use order_desk_client::export::{ExportError, export_stats_report};
use order_desk_core::format_rupees;

use super::Context;

/// Print dashboard statistics, optionally saving the text report to `export`.
pub async fn show(ctx: &Context, export: Option<&Path>) -> Result<(), ExportError> {
    let fetched = ctx.client.stats_or_sample().await;
    if fetched.is_sample() {
        tracing::warn!("API unavailable, showing sample statistics");
    }
    let stats = fetched.data;

    tracing::info!("Today's orders:      {}", stats.today_orders);
    tracing::info!("Monthly revenue:     {}", format_rupees(stats.monthly_revenue));
    tracing::info!("Unpaid orders:       {}", stats.unpaid_orders);
    tracing::info!("Total customers:     {}", stats.total_customers);
    tracing::info!("Total orders:        {}", stats.total_orders);
    tracing::info!("Total products:      {}", stats.total_products);
    tracing::info!("Average order value: {}", format_rupees(stats.average_order_value));

    if let Some(path) = export {
        export_stats_report(path, &stats, Local::now().date_naive())?;
        tracing::info!("Statistics report saved to {}", path.display());
    }
    Ok(())
}

/// Print the API connection status.
pub async fn health(ctx: &Context) {
    let status = ctx.client.health().await;
    tracing::info!("{} ({})", status, ctx.client.base_url());
}
