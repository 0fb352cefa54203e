// core/src/model/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  /// Unit price in the smallest currency unit.
  pub cost: i64,
  /// Units in stock.
  pub quantity: i32,
  pub seller_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
  pub name: String,
  pub cost: i64,
  pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
  pub name: Option<String>,
  pub cost: Option<i64>,
  pub quantity: Option<i32>,
}

impl ProductChanges {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.cost.is_none() && self.quantity.is_none()
  }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
  pub seller_id: Option<Uuid>,
  pub name: Option<String>,
}

impl ProductFilter {
  pub fn matches(&self, product: &Product) -> bool {
    self.seller_id.map_or(true, |id| product.seller_id == id)
      && self.name.as_deref().map_or(true, |name| product.name == name)
  }
}
