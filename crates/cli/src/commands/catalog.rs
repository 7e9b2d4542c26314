//! Catalog, city and area listings.

use order_desk_client::ApiError;

use super::Context;

/// List products by category, optionally a single category.
pub async fn products(ctx: &Context, category: Option<&str>) -> Result<(), ApiError> {
    let groups = ctx.client.products_by_category().await?;
    let store = ctx.cart();
    let cart = store.cart();

    let mut shown = 0;
    for (name, products) in &groups {
        if category.is_some_and(|wanted| !wanted.eq_ignore_ascii_case(name)) {
            continue;
        }
        tracing::info!("{name}");
        for product in products {
            let stock = if product.in_stock() {
                format!("{} in stock", product.stock)
            } else {
                "out of stock".to_string()
            };
            let in_cart = match cart.quantity_of(product.id.as_str()) {
                0 => String::new(),
                quantity => format!(", {quantity} in cart"),
            };
            tracing::info!(
                "  {:>6}  {:<32} {:>10}  {stock}{in_cart}",
                product.id,
                product.name,
                product.unit_price.to_string()
            );
            shown += 1;
        }
    }

    if shown == 0 {
        tracing::info!("No products found");
    }
    Ok(())
}

/// List delivery cities.
pub async fn cities(ctx: &Context) {
    let cities = ctx.client.cities_or_sample().await;
    if cities.is_sample() {
        tracing::warn!("API unavailable, showing sample cities");
    }
    for city in &cities.data {
        tracing::info!("{city}");
    }
}

/// List known areas of `city`.
pub async fn areas(ctx: &Context, city: &str) {
    let areas = ctx.client.areas_or_empty(city).await;
    if areas.is_empty() {
        tracing::info!("No known areas for {city}");
    }
    for area in &areas {
        tracing::info!("{area}");
    }
}
