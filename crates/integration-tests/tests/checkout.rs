//! Cart persistence and order submission end to end.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::NaiveDate;
use order_desk_client::FileStore;
use order_desk_client::checkout::{EntrySubmitError, SubmitError, submit, submit_entry};
use order_desk_core::cart::{CART_STORAGE_KEY, CartStore, KeyValueStore, LEGACY_CART_STORAGE_KEY};
use order_desk_core::checkout::{CheckoutError, CheckoutForm};
use order_desk_core::entry::{EntryError, OrderEntry};
use order_desk_core::{OrderId, PaymentStatus};
use order_desk_integration_tests::{FIRST_ORDER_ID, StubApi};
use rust_decimal::Decimal;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
}

fn form() -> CheckoutForm {
    CheckoutForm {
        name: "Asha Verma".to_string(),
        phone: "+91 98200-12345".to_string(),
        city: "Mumbai".to_string(),
        area: "Bandra".to_string(),
        notes: "Ring twice".to_string(),
        ..CheckoutForm::default()
    }
}

async fn filled_cart(api: &StubApi, dir: &std::path::Path) -> CartStore<FileStore> {
    let client = api.client();
    let mut cart = CartStore::load(FileStore::new(dir));
    let hamper = client.product("1").await.unwrap();
    let katli = client.product("3").await.unwrap();
    cart.add_product(&hamper).unwrap();
    cart.add_product(&katli).unwrap();
    cart.add_product(&katli).unwrap();
    cart
}

#[tokio::test]
async fn test_cart_survives_reload() {
    let api = StubApi::spawn().await;
    let dir = tempfile::tempdir().unwrap();

    let cart = filled_cart(&api, dir.path()).await;
    assert_eq!(cart.total(), Decimal::from(1999 + 2 * 450));
    drop(cart);

    let reloaded = CartStore::load(FileStore::new(dir.path()));
    assert_eq!(reloaded.cart().len(), 2);
    assert_eq!(reloaded.cart().quantity_of("3"), 2);
    assert_eq!(reloaded.cart().get("1").unwrap().category, "Hampers");
}

#[tokio::test]
async fn test_legacy_cart_is_migrated_and_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStore::new(dir.path());
    storage
        .set(
            LEGACY_CART_STORAGE_KEY,
            r#"{"7":{"id":"7","name":"Gift Box","price":250,"quantity":2}}"#,
        )
        .unwrap();

    let mut cart = CartStore::load(storage);
    assert_eq!(cart.cart().quantity_of("7"), 2);

    cart.clear();
    let storage = cart.into_storage();
    assert_eq!(storage.get(LEGACY_CART_STORAGE_KEY).unwrap(), None);
    assert_eq!(storage.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("{}"));
}

#[tokio::test]
async fn test_out_of_stock_product_is_rejected() {
    let api = StubApi::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let client = api.client();

    let mut cart = CartStore::load(FileStore::new(dir.path()));
    let corporate = client.product("2").await.unwrap();
    assert!(cart.add_product(&corporate).is_err());

    let ladoo = client.product("SW-4").await.unwrap();
    cart.add_product(&ladoo).unwrap();
    cart.add_product(&ladoo).unwrap();
    assert!(cart.add_product(&ladoo).is_err());
    assert_eq!(cart.set_quantity_within_stock(&ladoo, 10), Some(2));
}

#[tokio::test]
async fn test_submit_places_order_and_clears_cart() {
    let api = StubApi::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let client = api.client();
    let mut cart = filled_cart(&api, dir.path()).await;

    let receipt = submit(&client, &mut cart, &form(), today()).await.unwrap();
    assert_eq!(receipt.order_id, Some(OrderId::new(FIRST_ORDER_ID.to_string())));
    assert_eq!(receipt.items, 2);
    assert_eq!(receipt.total, Decimal::from(2899));
    assert_eq!(receipt.delivery_date, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    assert!(cart.cart().is_empty());

    let posted = api.state.posted_orders();
    assert_eq!(posted.len(), 1);
    let order = &posted[0];
    assert_eq!(order["customer"]["Name"], "Asha Verma");
    assert_eq!(order["customer"]["Phone"], "+91 98200-12345");
    assert_eq!(order["order_source"], "Website");
    assert_eq!(order["payment_status"], "Unpaid");
    assert_eq!(order["delivery_date"], "2024-03-03");
    assert_eq!(order["notes"], "Ring twice");
    assert!(order.get("paid_to").is_none());

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["ProductID"], "1");
    assert_eq!(items[1]["Quantity"], 2);
    assert_eq!(items[1]["UnitPrice"].as_f64(), Some(450.0));

    let reloaded = CartStore::load(FileStore::new(dir.path()));
    assert!(reloaded.cart().is_empty());
}

#[tokio::test]
async fn test_paid_order_sends_recipient() {
    let api = StubApi::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let client = api.client();
    let mut cart = filled_cart(&api, dir.path()).await;

    let form = CheckoutForm {
        payment_status: PaymentStatus::Paid,
        paid_to: Some("Store UPI".to_string()),
        delivery_date: Some(today()),
        ..form()
    };
    submit(&client, &mut cart, &form, today()).await.unwrap();

    let order = &api.state.posted_orders()[0];
    assert_eq!(order["payment_status"], "Paid");
    assert_eq!(order["paid_to"], "Store UPI");
    assert_eq!(order["delivery_date"], "2024-03-02");
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let api = StubApi::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let client = api.client();
    let mut cart = filled_cart(&api, dir.path()).await;

    let form = CheckoutForm {
        phone: "12345".to_string(),
        ..form()
    };
    let err = submit(&client, &mut cart, &form, today()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(CheckoutError::InvalidPhone(_))));
    assert_eq!(api.state.request_count("/api/orders"), 0);
    assert_eq!(cart.cart().len(), 2);
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let api = StubApi::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let client = api.client();
    let mut cart = CartStore::load(FileStore::new(dir.path()));

    let err = submit(&client, &mut cart, &form(), today()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(CheckoutError::EmptyCart)));
    assert!(api.state.posted_orders().is_empty());
}

#[tokio::test]
async fn test_api_failure_keeps_cart() {
    let api = StubApi::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let client = api.client();
    let mut cart = filled_cart(&api, dir.path()).await;

    api.state.set_failing(true);
    let err = submit(&client, &mut cart, &form(), today()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Api(_)));
    assert_eq!(cart.cart().len(), 2);

    let reloaded = CartStore::load(FileStore::new(dir.path()));
    assert_eq!(reloaded.cart().item_count(), 3);

    // Retrying once the API recovers succeeds
    api.state.set_failing(false);
    let receipt = submit(&client, &mut cart, &form(), today()).await.unwrap();
    assert!(receipt.order_id.is_some());
    assert!(cart.cart().is_empty());
}

fn entry() -> OrderEntry {
    OrderEntry {
        phone: "9820012345".to_string(),
        items: vec!["1:1".parse().unwrap(), "3:2:420".parse().unwrap()],
        notes: "Phone order".to_string(),
        ..OrderEntry::default()
    }
}

#[tokio::test]
async fn test_dashboard_entry_places_order() {
    let api = StubApi::spawn().await;
    let client = api.client();

    let receipt = submit_entry(&client, &entry(), today()).await.unwrap();
    assert_eq!(receipt.order_id, Some(OrderId::new(FIRST_ORDER_ID.to_string())));
    assert_eq!(receipt.total, Decimal::from(1999 + 2 * 420));

    let order = &api.state.posted_orders()[0];
    assert_eq!(order["order_source"], "Web Dashboard");
    assert_eq!(order["customer"]["Name"], "Unknown");
    assert_eq!(order["customer"]["Phone"], "9820012345");
    assert_eq!(order["customer"]["City"], "");
    assert_eq!(order["notes"], "Phone order");
    assert_eq!(order["delivery_date"], "2024-03-03");
    assert!(order.get("paid_to").is_none());

    let items = order["items"].as_array().unwrap();
    assert_eq!(items[0]["ProductName"], "Premium Hamper");
    assert_eq!(items[0]["UnitPrice"].as_f64(), Some(1999.0));
    assert_eq!(items[1]["ProductName"], "Kaju Katli 500g");
    assert_eq!(items[1]["UnitPrice"].as_f64(), Some(420.0));
}

#[tokio::test]
async fn test_dashboard_entry_unknown_product_sends_nothing() {
    let api = StubApi::spawn().await;
    let entry = OrderEntry {
        items: vec!["999:1".parse().unwrap()],
        ..entry()
    };

    let err = submit_entry(&api.client(), &entry, today()).await.unwrap_err();
    assert!(matches!(err, EntrySubmitError::Invalid(EntryError::UnknownProduct(_))));
    assert!(api.state.posted_orders().is_empty());
}

#[tokio::test]
async fn test_dashboard_entry_api_failure() {
    let api = StubApi::spawn().await;
    api.state.set_failing(true);

    let err = submit_entry(&api.client(), &entry(), today()).await.unwrap_err();
    assert!(matches!(err, EntrySubmitError::Api(_)));
}
