// server/src/services/seed.rs

//! Demo data for local runs (`SEED_DB=true`). Existing accounts are left untouched.

use crate::errors::Result;
use crate::services::auth_service;
use coinslot::services::{products, users};
use coinslot::{NewProduct, NewUser, ProductFilter, Role, Store, User};
use tracing::{info, instrument};

pub const DEMO_PASSWORD: &str = "password";

async fn ensure_user(store: &dyn Store, username: &str, role: Role) -> Result<(User, bool)> {
  if let Some(existing) = users::find_by_username(store, username).await? {
    return Ok((existing, false));
  }
  let user = users::register(
    store,
    NewUser {
      username: username.to_string(),
      password_hash: auth_service::hash_password(DEMO_PASSWORD)?,
      role,
    },
  )
  .await?;
  Ok((user, true))
}

#[instrument(name = "seed::seed_demo_data", skip(store), err(Display))]
pub async fn seed_demo_data(store: &dyn Store) -> Result<()> {
  let (seller, _) = ensure_user(store, "demo_seller", Role::Seller).await?;
  let (_buyer, _) = ensure_user(store, "demo_buyer", Role::Buyer).await?;

  let existing = products::list_products(
    store,
    &ProductFilter {
      seller_id: Some(seller.id),
      name: None,
    },
  )
  .await?;
  for (name, cost, quantity) in [("Cola", 50, 10), ("Chips", 35, 20)] {
    if existing.iter().any(|p| p.name == name) {
      continue;
    }
    products::create_product(
      store,
      &seller,
      NewProduct {
        name: name.to_string(),
        cost,
        quantity,
      },
    )
    .await?;
  }
  info!("Demo data seeded.");
  Ok(())
}
