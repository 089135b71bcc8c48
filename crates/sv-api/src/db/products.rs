//! Product inventory queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sv_protocol::product::Product;

/// Product row returned from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub description: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            description: row.description,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// List all products in seed order (UUIDv7 ids sort by insertion time).
pub async fn list_all(pool: &PgPool) -> Result<Vec<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>("SELECT * FROM products ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Ordered catalog of product names handed to the intent parser.
pub async fn catalog_names(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT name FROM products ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Get a product by its (lowercase) name.
pub async fn get_by_name(pool: &PgPool, name: &str) -> Result<Option<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Count products (seeding guard).
pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
}

/// Insert a new product.
pub async fn insert(pool: &PgPool, product: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (id, name, price, stock, description, category, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.stock)
    .bind(&product.description)
    .bind(&product.category)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}
