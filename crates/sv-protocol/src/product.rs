//! Inventory product records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vending slot product.
///
/// `name` is stored lowercase; it doubles as the catalog entry handed to the
/// intent parser, which matches message text against it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID (UUIDv7 for time-sortability).
    pub id: Uuid,
    /// Lowercase product name, unique within the machine.
    pub name: String,
    /// Unit price in dollars.
    pub price: f64,
    /// Cans currently in the machine.
    pub stock: i32,
    /// Optional shelf description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Product category (e.g. "cola", "citrus").
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        price: f64,
        stock: i32,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into().trim().to_lowercase(),
            price,
            stock,
            description: Some(description.into()),
            category: category.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_name() {
        let product = Product::new("  Mountain Dew ", 1.55, 30, "Citrus soda", "citrus");
        assert_eq!(product.name, "mountain dew");
        assert_eq!(product.stock, 30);
    }

    #[test]
    fn product_roundtrip() {
        let product = Product::new("coke", 1.50, 50, "Classic Coca-Cola", "cola");
        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "coke");
        assert_eq!(back.price, 1.50);
        assert_eq!(back.id, product.id);
    }
}
