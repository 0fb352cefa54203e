// server/src/models/product.rs

use chrono::{DateTime, Utc};
use coinslot::Product;
use sqlx::FromRow;
use uuid::Uuid;

pub const PRODUCT_COLUMNS: &str = "id, name, cost, quantity, seller_id, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
  pub id: Uuid,
  pub name: String,
  pub cost: i64,
  pub quantity: i32,
  pub seller_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      name: row.name,
      cost: row.cost,
      quantity: row.quantity,
      seller_id: row.seller_id,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}
