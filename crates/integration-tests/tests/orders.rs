//! Order listings, stats and health against the stub API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::atomic::Ordering;

use chrono::NaiveDate;
use order_desk_client::export::{export_stats_report, write_orders_csv};
use order_desk_core::orders::{OrderFilter, OrderQuery, OrdersSummary};
use order_desk_core::{ConnectionStatus, PaymentStatus};
use order_desk_integration_tests::StubApi;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_orders_live() {
    let api = StubApi::spawn().await;
    let client = api.client();

    let fetched = client.orders_or_sample(&OrderQuery::default()).await;
    assert!(!fetched.is_sample());
    assert_eq!(fetched.data.len(), 3);

    let first = &fetched.data[0];
    assert_eq!(first.id.as_ref().map(|id| id.as_str()), Some("501"));
    assert_eq!(first.short_time(), "10:05");
    assert_eq!(first.items_summary(), "Premium Hamper × 2");
    assert_eq!(first.payment_status, Some(PaymentStatus::Paid));
}

#[tokio::test]
async fn test_server_side_query() {
    let api = StubApi::spawn().await;
    let client = api.client();

    let query = OrderQuery {
        phone: Some("9820012345".to_string()),
        payment_status: Some(PaymentStatus::CashOnDelivery),
        limit: Some(5),
        ..OrderQuery::default()
    };
    let orders = client.orders(&query).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].area.as_deref(), Some("Powai"));

    assert!(
        api.state
            .requests()
            .contains(&"/api/orders?limit=5&payment_status=Cash on Delivery&phone=9820012345".to_string())
    );
}

#[tokio::test]
async fn test_local_filter_and_summary() {
    let api = StubApi::spawn().await;
    let orders = api.client().orders(&OrderQuery::default()).await.unwrap();

    let filter = OrderFilter {
        search: Some("asha".to_string()),
        ..OrderFilter::default()
    };
    let matched = filter.apply(&orders);
    assert_eq!(matched.len(), 2);

    let summary = OrdersSummary::of(matched.iter().copied());
    assert_eq!(summary.count, 2);
    assert_eq!(summary.total_amount, Decimal::from(4638));
    assert_eq!(summary.paid, 1);
    assert_eq!(summary.unpaid, 0);

    let mut csv = Vec::new();
    write_orders_csv(&mut csv, &matched).unwrap();
    let text = String::from_utf8(csv).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("503,2024-03-03,09:00,Asha Verma,9820012345,Mumbai,Powai,640,Cash on Delivery,2024-03-04"));
}

#[tokio::test]
async fn test_orders_fall_back_to_samples() {
    let api = StubApi::spawn().await;
    api.state.set_failing(true);

    let fetched = api.client().orders_or_sample(&OrderQuery::default()).await;
    assert!(fetched.is_sample());
    assert_eq!(fetched.data.len(), 3);
    assert_eq!(
        fetched.data[0].id.as_ref().map(|id| id.as_str()),
        Some("ORD001")
    );
}

#[tokio::test]
async fn test_stats_live_and_fallback() {
    let api = StubApi::spawn().await;
    let client = api.client();

    let live = client.stats_or_sample().await;
    assert!(!live.is_sample());
    assert_eq!(live.data.total_orders, 212);
    assert_eq!(live.data.monthly_revenue, Decimal::new(482_505, 1));

    api.state.set_failing(true);
    let fallback = client.stats_or_sample().await;
    assert!(fallback.is_sample());
    assert_eq!(fallback.data.today_orders, 15);
    assert_eq!(fallback.data.average_order_value, Decimal::new(362_318, 2));
}

#[tokio::test]
async fn test_stats_report_export() {
    let api = StubApi::spawn().await;
    let stats = api.client().stats_or_sample().await.data;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats_report.txt");
    export_stats_report(&path, &stats, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()).unwrap();

    let report = std::fs::read_to_string(&path).unwrap();
    assert!(report.contains("Total Orders: 212\n"));
    assert!(report.contains("Monthly Revenue: ₹48250.50\n"));
}

#[tokio::test]
async fn test_health_states() {
    let api = StubApi::spawn().await;
    let client = api.client();
    assert_eq!(client.health().await, ConnectionStatus::Connected);

    api.state.healthy.store(false, Ordering::SeqCst);
    assert_eq!(client.health().await, ConnectionStatus::Disconnected);

    let base_url = api.base_url();
    drop(api);
    // Give the aborted server task a moment to release the port
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let offline = order_desk_client::ApiClient::new(
        &order_desk_client::ClientConfig::new(&base_url).unwrap(),
    )
    .unwrap();
    assert_eq!(offline.health().await, ConnectionStatus::Offline);
}
