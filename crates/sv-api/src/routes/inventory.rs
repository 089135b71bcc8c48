//! Inventory listing endpoint.

use axum::Json;
use axum::extract::State;

use sv_protocol::product::Product;

use crate::db;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/v1/inventory — list products in catalog order.
pub async fn list_inventory(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = if let Some(pool) = &state.pool {
        db::products::list_all(pool)
            .await?
            .into_iter()
            .map(Product::from)
            .collect()
    } else {
        state.products.read().await.clone()
    };
    Ok(Json(products))
}
