// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use coinslot::{MemoryStore, NewProduct, NewUser, Product, ProductStore, Role, User, UserStore};
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---

pub async fn seed_user(store: &MemoryStore, username: &str, role: Role, balance: i64) -> User {
  let user = store
    .create_user(NewUser {
      username: username.to_string(),
      password_hash: format!("hash-of-{}", username),
      role,
    })
    .await
    .expect("seed user");
  if balance != 0 {
    store.update_user_balance(user.id, balance).await.expect("seed balance");
  }
  store.find_user_by_id(user.id).await.expect("reload").expect("seeded user exists")
}

pub async fn seed_buyer(store: &MemoryStore, balance: i64) -> User {
  seed_user(store, "buyer", Role::Buyer, balance).await
}

pub async fn seed_seller(store: &MemoryStore) -> User {
  seed_user(store, "seller", Role::Seller, 0).await
}

pub async fn seed_product(store: &MemoryStore, seller: &User, name: &str, cost: i64, quantity: i32) -> Product {
  store
    .create_product(
      seller.id,
      NewProduct {
        name: name.to_string(),
        cost,
        quantity,
      },
    )
    .await
    .expect("seed product")
}

/// Current balance as stored, not as carried on a possibly stale `User`.
pub async fn balance_of(store: &MemoryStore, user: &User) -> i64 {
  store.find_user_by_id(user.id).await.unwrap().unwrap().balance
}

pub async fn stock_of(store: &MemoryStore, product: &Product) -> i32 {
  store.find_product_by_id(product.id).await.unwrap().unwrap().quantity
}
