//! Catalog, city and area lookups against the stub API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use order_desk_client::{ApiError, DataSource};
use order_desk_core::UnitPrice;
use order_desk_integration_tests::StubApi;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_products_by_category() {
    let api = StubApi::spawn().await;
    let client = api.client();

    let groups = client.products_by_category().await.unwrap();
    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["Hampers", "Sweets"]);

    let sweets = &groups["Sweets"];
    assert_eq!(sweets.len(), 2);
    assert_eq!(sweets[0].unit_price, UnitPrice::from_rupees(450));
    assert_eq!(sweets[1].id.as_str(), "SW-4");
}

#[tokio::test]
async fn test_flat_products_and_categories() {
    let api = StubApi::spawn().await;
    let client = api.client();

    let products = client.products().await.unwrap();
    assert_eq!(products.len(), 4);
    let corporate = products.iter().find(|p| p.id.as_str() == "2").unwrap();
    assert!(!corporate.in_stock());
    assert_eq!(corporate.unit_price.amount(), Decimal::new(24995, 1));

    let categories = client.categories().await.unwrap();
    assert_eq!(categories, vec!["Hampers".to_string(), "Sweets".to_string()]);
}

#[tokio::test]
async fn test_catalog_is_cached() {
    let api = StubApi::spawn().await;
    let client = api.client();

    client.products_by_category().await.unwrap();
    client.products_by_category().await.unwrap();
    client.product("3").await.unwrap();
    assert_eq!(api.state.request_count("/api/products/grouped-by-category"), 1);

    client.invalidate_cache();
    client.products_by_category().await.unwrap();
    assert_eq!(api.state.request_count("/api/products/grouped-by-category"), 2);
}

#[tokio::test]
async fn test_product_lookup_fills_category() {
    let api = StubApi::spawn().await;
    let client = api.client();

    let hamper = client.product("1").await.unwrap();
    assert_eq!(hamper.name, "Premium Hamper");
    assert_eq!(hamper.category.as_deref(), Some("Hampers"));

    let missing = client.product("999").await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_cities_live_and_fallback() {
    let api = StubApi::spawn().await;
    let client = api.client();

    let live = client.cities_or_sample().await;
    assert_eq!(live.source, DataSource::Live);
    assert_eq!(live.data, vec!["Mumbai", "Pune", "New Delhi"]);

    // A fresh client has an empty cache
    api.state.set_failing(true);
    let fallback = api.client().cities_or_sample().await;
    assert!(fallback.is_sample());
    assert_eq!(fallback.data.first().map(String::as_str), Some("Mumbai"));
    assert_eq!(fallback.data.len(), 6);
}

#[tokio::test]
async fn test_areas_encode_city() {
    let api = StubApi::spawn().await;
    let client = api.client();

    let areas = client.areas("New Delhi").await.unwrap();
    assert_eq!(areas, vec!["Connaught Place", "Saket"]);
    assert!(client.areas("Nagpur").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_areas_error_yields_empty_list() {
    let api = StubApi::spawn().await;
    api.state.set_failing(true);

    let client = api.client();
    assert!(matches!(
        client.areas("Mumbai").await,
        Err(ApiError::Status(500, ref msg)) if msg == "Database unavailable"
    ));
    assert!(client.areas_or_empty("Mumbai").await.is_empty());
}
