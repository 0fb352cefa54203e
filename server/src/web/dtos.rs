// server/src/web/dtos.rs

//! Request and response bodies. Field names are camelCase on the wire.

use actix_web::web;
use coinslot::{ProductFilter, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::Result;

// --- Users ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
  #[validate(length(min = 1, max = 64, message = "username must be between 1 and 64 characters"))]
  pub username: String,
  #[validate(length(min = 6, message = "password must be at least 6 characters"))]
  pub password: String,
  pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
  #[validate(length(min = 1, message = "username is required"))]
  pub username: String,
  #[validate(length(min = 1, message = "password is required"))]
  pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
  pub token: String,
  pub user_id: Uuid,
}

/// Unknown fields (`role`, `balance`, ...) are rejected rather than ignored.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
  #[validate(length(min = 1, max = 64, message = "username must be between 1 and 64 characters"))]
  pub username: Option<String>,
  #[validate(length(min = 6, message = "password must be at least 6 characters"))]
  pub password: Option<String>,
}

// --- Products ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
  #[validate(length(min = 1, max = 128, message = "name must be between 1 and 128 characters"))]
  pub name: String,
  #[validate(range(min = 1, message = "cost must be a positive integer"))]
  pub cost: i64,
  #[validate(range(min = 0, message = "quantity must not be negative"))]
  pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProductRequest {
  #[validate(length(min = 1, max = 128, message = "name must be between 1 and 128 characters"))]
  pub name: Option<String>,
  #[validate(range(min = 1, message = "cost must be a positive integer"))]
  pub cost: Option<i64>,
  #[validate(range(min = 0, message = "quantity must not be negative"))]
  pub quantity: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
  pub seller_id: Option<Uuid>,
  pub name: Option<String>,
}

impl From<ListProductsQuery> for ProductFilter {
  fn from(query: ListProductsQuery) -> Self {
    ProductFilter {
      seller_id: query.seller_id,
      name: query.name,
    }
  }
}

// --- Vending ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
  pub amount: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
  pub product_id: Uuid,
  #[validate(range(min = 1, message = "quantity must be a positive integer"))]
  pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
  pub message: String,
}

/// Unwraps a JSON body and runs its `Validate` rules.
pub fn validated<T: Validate>(payload: web::Json<T>) -> Result<T> {
  let inner = payload.into_inner();
  inner.validate()?;
  Ok(inner)
}
