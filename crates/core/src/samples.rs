//! Offline fallback data.
//!
//! Shown when the API cannot be reached so the desk stays usable; callers
//! always tell the user they are looking at sample data.

use rust_decimal::Decimal;

use crate::orders::{Order, OrderLine};
use crate::stats::Stats;
use crate::types::{OrderId, PaymentStatus};

/// Cities offered when `/api/cities` fails.
pub const SAMPLE_CITIES: &[&str] = &["Mumbai", "Delhi", "Bangalore", "Hyderabad", "Chennai", "Kolkata"];

/// Sample cities as owned strings.
#[must_use]
pub fn sample_cities() -> Vec<String> {
    SAMPLE_CITIES.iter().map(|&city| city.to_owned()).collect()
}

/// Orders shown when `/api/orders` fails.
#[must_use]
pub fn sample_orders() -> Vec<Order> {
    vec![
        sample_order(
            "ORD001",
            ("2024-01-15", "14:30:00"),
            ("John Doe", "9876543210", "Mumbai", "Andheri"),
            &[("Premium Hamper", 1), ("Chocolate Box", 2)],
            3197,
            PaymentStatus::Paid,
        ),
        sample_order(
            "ORD002",
            ("2024-01-14", "11:15:00"),
            ("Jane Smith", "9876543211", "Delhi", "Connaught Place"),
            &[("Festival Box", 1)],
            1499,
            PaymentStatus::Unpaid,
        ),
        sample_order(
            "ORD003",
            ("2024-01-13", "16:45:00"),
            ("Robert Johnson", "9876543212", "Bangalore", "Koramangala"),
            &[("Corporate Hamper", 3), ("Dry Fruit Box", 2)],
            8595,
            PaymentStatus::CashOnDelivery,
        ),
    ]
}

/// Stats shown when `/api/stats` fails.
#[must_use]
pub fn sample_stats() -> Stats {
    Stats {
        today_orders: 15,
        monthly_revenue: Decimal::from(125_000),
        unpaid_orders: 8,
        total_customers: 125,
        total_orders: 345,
        total_products: 45,
        average_order_value: Decimal::new(362_318, 2),
    }
}

fn sample_order(
    id: &str,
    (date, time): (&str, &str),
    (name, phone, city, area): (&str, &str, &str, &str),
    items: &[(&str, u32)],
    total: u32,
    status: PaymentStatus,
) -> Order {
    Order {
        id: Some(OrderId::new(id)),
        order_date: Some(date.to_owned()),
        order_time: Some(time.to_owned()),
        customer_name: Some(name.to_owned()),
        phone: Some(phone.to_owned()),
        city: Some(city.to_owned()),
        area: Some(area.to_owned()),
        items: items
            .iter()
            .map(|&(product_name, quantity)| OrderLine {
                product_name: product_name.to_owned(),
                quantity: Decimal::from(quantity),
            })
            .collect(),
        total_amount: Decimal::from(total),
        payment_status: Some(status),
        delivery_date: None,
    }
}
