//! Checkout form validation and order request assembly.
//!
//! [`CheckoutForm::build_order`] is the whole of the client-side checkout
//! logic: it validates the form in field order (first failure wins) and
//! turns the cart into an [`OrderRequest`]. Submitting the request and
//! clearing the cart afterwards is done by the client crate.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::cart::Cart;
use crate::types::{PaymentStatus, ProductId, UnitPrice};

/// Value of `order_source` for orders placed through checkout.
pub const ORDER_SOURCE: &str = "Website";

/// Minimum number of digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Checkout validation failures, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Please enter customer name")]
    MissingName,

    #[error("Please enter a valid phone number (10 digits): {0:?}")]
    InvalidPhone(String),

    #[error("Please select a city")]
    MissingCity,

    #[error("Please enter area")]
    MissingArea,

    #[error("Please add items to cart")]
    EmptyCart,

    #[error("Please enter who received the payment")]
    MissingPaidTo,

    #[error("Delivery date {date} is before today ({today})")]
    DeliveryDateInPast { date: NaiveDate, today: NaiveDate },
}

/// Raw checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub city: String,
    pub area: String,
    pub payment_status: PaymentStatus,
    pub paid_to: Option<String>,
    pub notes: String,
    pub delivery_date: Option<NaiveDate>,
}

/// Customer block of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerDetails {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Area")]
    pub area: String,
}

/// One item of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    #[serde(rename = "ProductID")]
    pub product_id: ProductId,
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "UnitPrice")]
    pub unit_price: UnitPrice,
}

/// The payload posted to `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub customer: CustomerDetails,
    pub items: Vec<OrderItem>,
    pub order_source: String,
    pub payment_status: PaymentStatus,
    pub notes: String,
    pub delivery_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_to: Option<String>,
}

impl OrderRequest {
    /// Sum of `unit_price * quantity` over all items.
    #[must_use]
    pub fn total(&self) -> rust_decimal::Decimal {
        self.items
            .iter()
            .map(|item| item.unit_price.times(item.quantity))
            .sum()
    }
}

impl CheckoutForm {
    /// Validate the form and build the order for `cart`.
    ///
    /// `today` anchors the delivery date: it defaults to the day after and
    /// may not be earlier than `today`.
    ///
    /// # Errors
    ///
    /// Returns the first `CheckoutError` in field order.
    pub fn build_order(&self, cart: &Cart, today: NaiveDate) -> Result<OrderRequest, CheckoutError> {
        let name = required(&self.name).ok_or(CheckoutError::MissingName)?;
        let phone = validate_phone(&self.phone)?;
        let city = required(&self.city).ok_or(CheckoutError::MissingCity)?;
        let area = required(&self.area).ok_or(CheckoutError::MissingArea)?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let paid_to = if self.payment_status == PaymentStatus::Paid {
            let recipient = self
                .paid_to
                .as_deref()
                .and_then(required)
                .ok_or(CheckoutError::MissingPaidTo)?;
            Some(recipient.to_owned())
        } else {
            None
        };

        let delivery_date = match self.delivery_date {
            Some(date) if date < today => {
                return Err(CheckoutError::DeliveryDateInPast { date, today });
            }
            Some(date) => date,
            None => default_delivery_date(today),
        };

        let items = cart
            .lines()
            .into_iter()
            .map(|line| OrderItem {
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        Ok(OrderRequest {
            customer: CustomerDetails {
                name: name.to_owned(),
                phone,
                city: city.to_owned(),
                area: area.to_owned(),
            },
            items,
            order_source: ORDER_SOURCE.to_owned(),
            payment_status: self.payment_status.clone(),
            notes: self.notes.trim().to_owned(),
            delivery_date,
            paid_to,
        })
    }
}

/// The delivery date used when none is given: tomorrow.
#[must_use]
pub fn default_delivery_date(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

pub(crate) fn required(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn validate_phone(raw: &str) -> Result<String, CheckoutError> {
    let phone = raw.trim();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-'));
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !allowed || digits < MIN_PHONE_DIGITS {
        return Err(CheckoutError::InvalidPhone(raw.to_owned()));
    }
    Ok(phone.to_owned())
}
