//! Startup inventory seeding.

use sv_protocol::product::Product;

use crate::db;
use crate::state::AppState;

/// The six sample sodas stocked in a fresh machine.
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new("coke", 1.50, 50, "Classic Coca-Cola", "cola"),
        Product::new("pepsi", 1.45, 45, "Pepsi Cola", "cola"),
        Product::new("sprite", 1.40, 40, "Lemon-lime soda", "lemon-lime"),
        Product::new("fanta", 1.35, 35, "Orange soda", "orange"),
        Product::new("mountain dew", 1.55, 30, "Citrus soda", "citrus"),
        Product::new("dr pepper", 1.60, 25, "Unique blend of 23 flavors", "unique"),
    ]
}

/// Insert the sample products unless the store already holds inventory.
pub async fn seed_products(state: &AppState) -> anyhow::Result<()> {
    if let Some(pool) = &state.pool {
        if db::products::count(pool).await? > 0 {
            tracing::debug!("products already seeded");
            return Ok(());
        }
        let products = sample_products();
        for product in &products {
            db::products::insert(pool, product).await?;
        }
        tracing::info!(count = products.len(), "seeded sample products");
    } else {
        let mut shelf = state.products.write().await;
        if shelf.is_empty() {
            *shelf = sample_products();
            tracing::info!(count = shelf.len(), "seeded sample products (in-memory)");
        }
    }
    Ok(())
}
