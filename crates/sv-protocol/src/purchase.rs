//! Purchase API bodies and transaction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for the purchase endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// Natural-language customer message.
    pub message: String,
}

/// Response body for the purchase endpoint.
///
/// `success: false` with HTTP 200 means the message was understood but the
/// request could not be fulfilled (unknown product, insufficient stock,
/// unclear intent); transport-level problems surface as HTTP errors instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub success: bool,
    /// Customer-facing reply text.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_stock: Option<i32>,
}

impl PurchaseResponse {
    /// Successful reply with no purchase details (query/cancel/refuse paths).
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            product_name: None,
            quantity: None,
            total_amount: None,
            remaining_stock: None,
        }
    }

    /// Understood-but-unfulfillable reply.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            product_name: None,
            quantity: None,
            total_amount: None,
            remaining_stock: None,
        }
    }
}

/// A completed purchase, as persisted in the transaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique transaction ID (UUIDv7).
    pub id: Uuid,
    /// Product that was dispensed.
    pub product_id: Uuid,
    /// Product name at purchase time.
    pub product_name: String,
    /// Cans dispensed.
    pub quantity: u32,
    /// Total charged, in dollars.
    pub total_amount: f64,
    /// Payment method ("cash" for the walk-up machine).
    pub payment_method: String,
    /// Lifecycle status ("completed" on the happy path).
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Record a completed cash purchase.
    pub fn completed(
        product_id: Uuid,
        product_name: impl Into<String>,
        quantity: u32,
        total_amount: f64,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            product_id,
            product_name: product_name.into(),
            quantity,
            total_amount,
            payment_method: "cash".into(),
            status: "completed".into(),
            created_at: Utc::now(),
        }
    }
}
