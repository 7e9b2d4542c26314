//! Dashboard statistics from `GET /api/stats`.

use std::fmt::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::format_rupees;

const REPORT_RULE: &str = "==================================";

/// Headline numbers for the dashboard. Missing fields default to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    #[serde(deserialize_with = "crate::wire::null_as_default")]
    pub today_orders: u64,
    #[serde(deserialize_with = "crate::wire::null_as_default")]
    pub monthly_revenue: Decimal,
    #[serde(deserialize_with = "crate::wire::null_as_default")]
    pub unpaid_orders: u64,
    #[serde(deserialize_with = "crate::wire::null_as_default")]
    pub total_customers: u64,
    #[serde(deserialize_with = "crate::wire::null_as_default")]
    pub total_orders: u64,
    #[serde(deserialize_with = "crate::wire::null_as_default")]
    pub total_products: u64,
    #[serde(deserialize_with = "crate::wire::null_as_default")]
    pub average_order_value: Decimal,
}

impl Stats {
    /// Plain-text statistics report, as saved by `stats --export`.
    #[must_use]
    pub fn report(&self, generated_on: NaiveDate) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "ORDER DESK - STATISTICS REPORT");
        let _ = writeln!(out, "Generated on: {}", generated_on.format("%d/%m/%Y"));
        let _ = writeln!(out);
        let _ = writeln!(out, "{REPORT_RULE}");
        let _ = writeln!(out);
        let _ = writeln!(out, "OVERVIEW:");
        let _ = writeln!(out, "---------");
        let _ = writeln!(out, "Today's Orders: {}", self.today_orders);
        let _ = writeln!(out, "Monthly Revenue: {}", format_rupees(self.monthly_revenue));
        let _ = writeln!(out, "Pending Orders: {}", self.unpaid_orders);
        let _ = writeln!(out, "Total Customers: {}", self.total_customers);
        let _ = writeln!(out, "Total Orders: {}", self.total_orders);
        let _ = writeln!(out, "Total Products: {}", self.total_products);
        let _ = writeln!(
            out,
            "Average Order Value: {}",
            format_rupees(self.average_order_value)
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "{REPORT_RULE}");
        let _ = writeln!(out);
        let _ = writeln!(out, "END OF REPORT");
        out
    }
}
