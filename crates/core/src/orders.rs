//! Order read model, local filtering and summaries.
//!
//! Orders are owned by the external API; this module only describes what
//! comes back from `GET /api/orders` and how the desk narrows it down.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, PaymentStatus};

/// An item line as reported in an order listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "ProductName", default, deserialize_with = "crate::wire::null_as_default")]
    pub product_name: String,
    #[serde(rename = "Quantity", default, deserialize_with = "crate::wire::null_as_default")]
    pub quantity: Decimal,
}

/// An order as returned by the API. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "OrderID", default)]
    pub id: Option<OrderId>,
    #[serde(rename = "OrderDate", default)]
    pub order_date: Option<String>,
    #[serde(rename = "Ordertime", default)]
    pub order_time: Option<String>,
    #[serde(rename = "CustomerName", default)]
    pub customer_name: Option<String>,
    #[serde(rename = "Phone", default, deserialize_with = "crate::wire::text_or_number")]
    pub phone: Option<String>,
    #[serde(rename = "CustomerCity", default)]
    pub city: Option<String>,
    #[serde(rename = "CustomerArea", default)]
    pub area: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub items: Vec<OrderLine>,
    #[serde(rename = "TotalAmount", default, deserialize_with = "crate::wire::null_as_default")]
    pub total_amount: Decimal,
    #[serde(rename = "PaymentStatus", default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub delivery_date: Option<String>,
}

impl Order {
    /// `HH:MM` part of the order time.
    #[must_use]
    pub fn short_time(&self) -> &str {
        self.order_time
            .as_deref()
            .map_or("", |time| time.get(..5).unwrap_or(time))
    }

    /// Items formatted as "Name × qty" joined with commas.
    #[must_use]
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} × {}", item.product_name, item.quantity.normalize()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Local filter over a fetched order list.
///
/// Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Case-insensitive substring of order ID, customer name, city or area;
    /// plain substring of the phone number.
    pub search: Option<String>,
    /// Exact payment status.
    pub payment_status: Option<PaymentStatus>,
    /// Exact order date.
    pub date: Option<NaiveDate>,
}

impl OrderFilter {
    /// Whether `order` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.matches_search(order) && self.matches_status(order) && self.matches_date(order)
    }

    /// Orders from `orders` that satisfy the filter, in input order.
    #[must_use]
    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|order| self.matches(order)).collect()
    }

    fn matches_search(&self, order: &Order) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term_lower = term.to_lowercase();
        let contains = |field: Option<&str>| {
            field.is_some_and(|value| value.to_lowercase().contains(&term_lower))
        };

        contains(order.id.as_ref().map(OrderId::as_str))
            || contains(order.customer_name.as_deref())
            || order.phone.as_deref().is_some_and(|phone| phone.contains(term))
            || contains(order.city.as_deref())
            || contains(order.area.as_deref())
    }

    fn matches_status(&self, order: &Order) -> bool {
        self.payment_status
            .as_ref()
            .is_none_or(|status| order.payment_status.as_ref() == Some(status))
    }

    fn matches_date(&self, order: &Order) -> bool {
        self.date.is_none_or(|date| {
            order.order_date.as_deref() == Some(date.format("%Y-%m-%d").to_string().as_str())
        })
    }
}

/// Aggregate figures over a list of orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersSummary {
    pub count: usize,
    pub total_amount: Decimal,
    pub paid: usize,
    pub unpaid: usize,
}

impl OrdersSummary {
    /// Summarize `orders`.
    #[must_use]
    pub fn of<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders.into_iter().fold(Self::default(), |mut summary, order| {
            summary.count += 1;
            summary.total_amount += order.total_amount;
            match order.payment_status {
                Some(PaymentStatus::Paid) => summary.paid += 1,
                Some(PaymentStatus::Unpaid) => summary.unpaid += 1,
                _ => {}
            }
            summary
        })
    }
}

/// Server-side filters for `GET /api/orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub phone: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub from_date: Option<NaiveDate>,
    pub limit: Option<u32>,
}

impl OrderQuery {
    /// Query-string pairs for the set filters.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.is_empty()) {
            pairs.push(("phone", phone.to_owned()));
        }
        if let Some(status) = &self.payment_status {
            pairs.push(("payment_status", status.to_string()));
        }
        if let Some(date) = self.from_date {
            pairs.push(("from_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}
