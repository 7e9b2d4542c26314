//! Staff order entry from the dashboard.
//!
//! Unlike checkout, dashboard entry does not go through the cart: the
//! operator lists items directly as `<product id>:<quantity>[:<unit price>]`
//! and only the phone number is mandatory.

use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::catalog::{ProductsByCategory, find_in_groups};
use crate::checkout::{CustomerDetails, OrderItem, OrderRequest, default_delivery_date, required};
use crate::types::{PaymentStatus, PriceError, ProductId, UnitPrice};

/// Value of `order_source` for orders entered on the dashboard.
pub const DASHBOARD_ORDER_SOURCE: &str = "Web Dashboard";

/// Customer name used when none is entered.
pub const UNKNOWN_CUSTOMER: &str = "Unknown";

/// Malformed `--item` arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemParseError {
    #[error("expected <product id>:<quantity>[:<unit price>], got {0:?}")]
    Syntax(String),

    #[error("invalid quantity {0:?}")]
    Quantity(String),

    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Dashboard entry failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("Please enter customer phone number")]
    MissingPhone,

    #[error("Please add at least one item")]
    NoItems,

    #[error("Product {0} not found in catalog")]
    UnknownProduct(ProductId),

    #[error("Delivery date {date} is before today ({today})")]
    DeliveryDateInPast { date: NaiveDate, today: NaiveDate },
}

/// One entered item line. Without a price the catalog price is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Option<UnitPrice>,
}

impl FromStr for EntryItem {
    type Err = ItemParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let (Some(id), Some(quantity)) = (parts.next(), parts.next()) else {
            return Err(ItemParseError::Syntax(s.to_owned()));
        };
        let price = parts.next();
        if parts.next().is_some() {
            return Err(ItemParseError::Syntax(s.to_owned()));
        }

        let id = required(id).ok_or_else(|| ItemParseError::Syntax(s.to_owned()))?;
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&q| q > 0)
            .ok_or_else(|| ItemParseError::Quantity(quantity.to_owned()))?;
        let unit_price = price.map(str::parse::<UnitPrice>).transpose()?;

        Ok(Self {
            product_id: ProductId::new(id),
            quantity,
            unit_price,
        })
    }
}

/// Raw dashboard entry input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderEntry {
    pub phone: String,
    pub name: String,
    pub city: String,
    pub area: String,
    pub payment_status: PaymentStatus,
    pub notes: String,
    pub items: Vec<EntryItem>,
    pub delivery_date: Option<NaiveDate>,
}

impl OrderEntry {
    /// Validate the entry and build the order, naming items from `catalog`.
    ///
    /// # Errors
    ///
    /// Returns the first `EntryError`: phone, items, then unknown products
    /// in entry order, then the delivery date.
    pub fn build_order(&self, catalog: &ProductsByCategory, today: NaiveDate) -> Result<OrderRequest, EntryError> {
        let phone = required(&self.phone).ok_or(EntryError::MissingPhone)?;
        if self.items.is_empty() {
            return Err(EntryError::NoItems);
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                let (_, product) = find_in_groups(catalog, item.product_id.as_str())
                    .ok_or_else(|| EntryError::UnknownProduct(item.product_id.clone()))?;
                Ok(OrderItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price.unwrap_or(product.unit_price),
                })
            })
            .collect::<Result<Vec<_>, EntryError>>()?;

        let delivery_date = match self.delivery_date {
            Some(date) if date < today => {
                return Err(EntryError::DeliveryDateInPast { date, today });
            }
            Some(date) => date,
            None => default_delivery_date(today),
        };

        Ok(OrderRequest {
            customer: CustomerDetails {
                name: required(&self.name).unwrap_or(UNKNOWN_CUSTOMER).to_owned(),
                phone: phone.to_owned(),
                city: self.city.trim().to_owned(),
                area: self.area.trim().to_owned(),
            },
            items,
            order_source: DASHBOARD_ORDER_SOURCE.to_owned(),
            payment_status: self.payment_status.clone(),
            notes: self.notes.trim().to_owned(),
            delivery_date,
            paid_to: None,
        })
    }
}
