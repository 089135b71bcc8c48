//! Shared application state for the Axum server.
//!
//! Supports two modes:
//! - **Database mode**: uses `PgPool` for persistent storage (production).
//! - **In-memory mode**: uses `RwLock<Vec>` shelves (tests and development).

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;

use sv_protocol::product::Product;
use sv_protocol::purchase::TransactionRecord;

use crate::inference::IntentParser;
use crate::seed::sample_products;

/// Shared application state, wrapped in `Arc` for Axum handler sharing.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool (None in test/in-memory mode).
    pub pool: Option<PgPool>,
    /// In-memory product shelf (used when pool is None). Order is seed
    /// order — it doubles as catalog order for the intent parser.
    pub products: Arc<RwLock<Vec<Product>>>,
    /// In-memory transaction log (used when pool is None).
    pub transactions: Arc<RwLock<Vec<TransactionRecord>>>,
    /// Two-stage intent parser.
    pub parser: Arc<IntentParser>,
}

impl AppState {
    /// Create state backed by a PostgreSQL pool.
    pub fn with_pool(pool: PgPool, parser: IntentParser) -> Self {
        Self {
            pool: Some(pool),
            products: Arc::new(RwLock::new(Vec::new())),
            transactions: Arc::new(RwLock::new(Vec::new())),
            parser: Arc::new(parser),
        }
    }

    /// Create in-memory state with an empty shelf.
    pub fn in_memory(parser: IntentParser) -> Self {
        Self {
            pool: None,
            products: Arc::new(RwLock::new(Vec::new())),
            transactions: Arc::new(RwLock::new(Vec::new())),
            parser: Arc::new(parser),
        }
    }

    /// In-memory state pre-stocked with the six sample sodas, rules-only
    /// parser. Used by tests; replace `parser` to enable the model tier.
    pub fn with_sample_data() -> Self {
        Self {
            pool: None,
            products: Arc::new(RwLock::new(sample_products())),
            transactions: Arc::new(RwLock::new(Vec::new())),
            parser: Arc::new(IntentParser::rules_only()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(IntentParser::rules_only())
    }
}
