//! Health and welcome endpoints.

use axum::Json;
use serde_json::{Value, json};

/// GET /health — liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET / — welcome document listing the API surface.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the AI-powered Soda Vending Machine!",
        "endpoints": {
            "purchase": "POST /api/v1/purchase",
            "inventory": "GET /api/v1/inventory",
            "transactions": "GET /api/v1/transactions",
        },
    }))
}
