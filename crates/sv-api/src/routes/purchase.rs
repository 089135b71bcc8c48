//! Natural-language purchase endpoint.
//!
//! The handler parses the customer message into a [`ParsedIntent`] and maps
//! each intent kind to the vending contract: queries list the shelf,
//! cancel/refuse acknowledge, purchases decrement stock and record a
//! transaction. Understood-but-unfulfillable requests answer HTTP 200 with
//! `success: false`; only a blank message is a transport-level error.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use sv_protocol::intent::{IntentKind, ParsedIntent};
use sv_protocol::purchase::{PurchaseRequest, PurchaseResponse, TransactionRecord};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /api/v1/purchase — process a natural-language purchase request.
pub async fn purchase(
    State(state): State<AppState>,
    Json(req): Json<PurchaseRequest>,
) -> ApiResult<Json<PurchaseResponse>> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }

    let catalog = catalog_names(&state).await?;
    let intent = state.parser.parse(message, &catalog).await;
    tracing::info!(
        intent = ?intent.intent(),
        product = intent.product_name(),
        confidence = intent.confidence(),
        reasoning = intent.reasoning(),
        "parsed purchase message"
    );

    let response = match intent.intent() {
        IntentKind::Query => shelf_reply(&state).await?,
        IntentKind::Refuse => {
            PurchaseResponse::info("No problem! Let me know if you change your mind.")
        }
        IntentKind::Cancel => PurchaseResponse::info(
            "Transaction cancelled. Is there anything else I can help you with?",
        ),
        IntentKind::Unknown => PurchaseResponse::failure(
            "I'm not sure what you want to do. You can ask about our products or try to make a purchase.",
        ),
        IntentKind::Purchase => fulfill(&state, &catalog, &intent).await?,
    };

    Ok(Json(response))
}

/// Ordered catalog snapshot handed to the intent parser.
async fn catalog_names(state: &AppState) -> ApiResult<Vec<String>> {
    if let Some(pool) = &state.pool {
        Ok(db::products::catalog_names(pool).await?)
    } else {
        Ok(state
            .products
            .read()
            .await
            .iter()
            .map(|p| p.name.clone())
            .collect())
    }
}

/// Query reply: every product with price and remaining stock.
async fn shelf_reply(state: &AppState) -> ApiResult<PurchaseResponse> {
    let lines: Vec<String> = if let Some(pool) = &state.pool {
        db::products::list_all(pool)
            .await?
            .iter()
            .map(|p| format!("{} (${:.2}) - {} in stock", p.name, p.price, p.stock))
            .collect()
    } else {
        state
            .products
            .read()
            .await
            .iter()
            .map(|p| format!("{} (${:.2}) - {} in stock", p.name, p.price, p.stock))
            .collect()
    };
    Ok(PurchaseResponse::info(format!(
        "Available products: {}",
        lines.join(", ")
    )))
}

/// Purchase path: validate extraction, then decrement stock and record the
/// transaction in whichever store is active.
async fn fulfill(
    state: &AppState,
    catalog: &[String],
    intent: &ParsedIntent,
) -> ApiResult<PurchaseResponse> {
    let Some(name) = intent.product_name() else {
        return Ok(PurchaseResponse::failure(format!(
            "I couldn't understand which product you want to buy. Available products: {}",
            catalog.join(", ")
        )));
    };
    let Some(quantity) = intent.quantity() else {
        return Ok(PurchaseResponse::failure(
            "Please specify a valid quantity to purchase.",
        ));
    };
    let quantity = quantity.get();

    if let Some(pool) = &state.pool {
        fulfill_db(pool, catalog, name, quantity).await
    } else {
        Ok(fulfill_in_memory(state, catalog, name, quantity).await)
    }
}

async fn fulfill_db(
    pool: &sqlx::PgPool,
    catalog: &[String],
    name: &str,
    quantity: u32,
) -> ApiResult<PurchaseResponse> {
    match db::transactions::record_purchase(pool, name, quantity).await? {
        Some((product, record)) => Ok(dispensed(
            &product.name,
            quantity,
            record.total_amount,
            product.stock,
        )),
        // Guarded update matched no row: either the slot is unknown or the
        // stock ran out — a read disambiguates.
        None => match db::products::get_by_name(pool, name).await? {
            Some(product) => Ok(insufficient(&product.name, product.stock, quantity)),
            None => Ok(not_found(name, catalog)),
        },
    }
}

async fn fulfill_in_memory(
    state: &AppState,
    catalog: &[String],
    name: &str,
    quantity: u32,
) -> PurchaseResponse {
    let mut products = state.products.write().await;
    let Some(product) = products.iter_mut().find(|p| p.name == name) else {
        return not_found(name, catalog);
    };

    if i64::from(product.stock) < i64::from(quantity) {
        return insufficient(&product.name, product.stock, quantity);
    }

    product.stock -= quantity as i32;
    product.updated_at = Utc::now();
    let total = product.price * f64::from(quantity);
    let record = TransactionRecord::completed(product.id, &product.name, quantity, total);
    let response = dispensed(&product.name, quantity, total, product.stock);
    drop(products);

    state.transactions.write().await.push(record);
    response
}

fn dispensed(name: &str, quantity: u32, total: f64, remaining: i32) -> PurchaseResponse {
    PurchaseResponse {
        success: true,
        message: format!("Successfully purchased {quantity} {name} for ${total:.2}"),
        product_name: Some(name.to_string()),
        quantity: Some(quantity),
        total_amount: Some(total),
        remaining_stock: Some(remaining),
    }
}

fn insufficient(name: &str, stock: i32, requested: u32) -> PurchaseResponse {
    PurchaseResponse::failure(format!(
        "Sorry, only {stock} {name} available. You requested {requested}."
    ))
}

fn not_found(name: &str, catalog: &[String]) -> PurchaseResponse {
    PurchaseResponse::failure(format!(
        "Product '{name}' not found. Available products: {}",
        catalog.join(", ")
    ))
}
