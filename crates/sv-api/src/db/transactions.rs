//! Transaction log queries and the guarded purchase write.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sv_protocol::purchase::TransactionRecord;

use super::products::ProductRow;

/// Transaction row returned from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub total_amount: f64,
    pub payment_method: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionRow> for TransactionRecord {
    fn from(row: TransactionRow) -> Self {
        TransactionRecord {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity.max(0) as u32,
            total_amount: row.total_amount,
            payment_method: row.payment_method,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// List all transactions, oldest first.
pub async fn list_all(pool: &PgPool) -> Result<Vec<TransactionRow>, sqlx::Error> {
    sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Atomically decrement stock and record the purchase.
///
/// The decrement is guarded by `stock >= quantity`, so two concurrent
/// buyers cannot oversell a slot. Returns `None` when the product does not
/// exist or has insufficient stock — callers disambiguate with a read.
pub async fn record_purchase(
    pool: &PgPool,
    name: &str,
    quantity: u32,
) -> Result<Option<(ProductRow, TransactionRecord)>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, ProductRow>(
        "UPDATE products
         SET stock = stock - $2, updated_at = now()
         WHERE name = $1 AND stock >= $2
         RETURNING *",
    )
    .bind(name)
    .bind(i64::from(quantity))
    .fetch_optional(&mut *tx)
    .await?;

    let Some(product) = updated else {
        tx.rollback().await?;
        return Ok(None);
    };

    let record = TransactionRecord::completed(
        product.id,
        &product.name,
        quantity,
        product.price * f64::from(quantity),
    );

    sqlx::query(
        "INSERT INTO transactions (id, product_id, product_name, quantity, total_amount, payment_method, status, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(record.id)
    .bind(record.product_id)
    .bind(&record.product_name)
    .bind(i64::from(record.quantity))
    .bind(record.total_amount)
    .bind(&record.payment_method)
    .bind(&record.status)
    .bind(record.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some((product, record)))
}
