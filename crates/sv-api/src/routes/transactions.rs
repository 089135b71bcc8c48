//! Transaction history endpoint.

use axum::Json;
use axum::extract::State;

use sv_protocol::purchase::TransactionRecord;

use crate::db;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/v1/transactions — purchase history, oldest first.
pub async fn list_transactions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TransactionRecord>>> {
    let transactions = if let Some(pool) = &state.pool {
        db::transactions::list_all(pool)
            .await?
            .into_iter()
            .map(TransactionRecord::from)
            .collect()
    } else {
        state.transactions.read().await.clone()
    };
    Ok(Json(transactions))
}
