// core/src/store/memory.rs

//! In-process store backed by `parking_lot::RwLock`.
//!
//! Both tables live behind a single lock so the settlement can re-check and apply
//! the debit and the decrement under one write guard. Guards are never held across
//! an `.await`; none of the methods below suspend while locked.

use crate::error::{StoreError, StoreResult};
use crate::model::{NewProduct, NewUser, Product, ProductChanges, ProductFilter, User, UserChanges};
use crate::store::{ProductStore, SettlementOrder, SettlementOutcome, SettlementStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
  users: HashMap<Uuid, User>,
  products: HashMap<Uuid, Product>,
}

/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  #[instrument(name = "memory_store::create_user", skip(self, new_user), fields(username = %new_user.username), err(Display))]
  async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
    let mut tables = self.tables.write();
    if tables.users.values().any(|u| u.username == new_user.username) {
      return Err(StoreError::UniqueViolation {
        field: "username".to_string(),
      });
    }
    let now = Utc::now();
    let user = User {
      id: Uuid::new_v4(),
      username: new_user.username,
      password_hash: new_user.password_hash,
      balance: 0,
      role: new_user.role,
      created_at: now,
      updated_at: now,
    };
    tables.users.insert(user.id, user.clone());
    debug!(user_id = %user.id, "User inserted.");
    Ok(user)
  }

  async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
    Ok(self.tables.read().users.get(&id).cloned())
  }

  async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
    Ok(self.tables.read().users.values().find(|u| u.username == username).cloned())
  }

  async fn find_users(&self) -> StoreResult<Vec<User>> {
    let mut users: Vec<User> = self.tables.read().users.values().cloned().collect();
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(users)
  }

  async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
    let mut tables = self.tables.write();
    if let Some(username) = changes.username.as_deref() {
      if tables.users.values().any(|u| u.username == username && u.id != id) {
        return Err(StoreError::UniqueViolation {
          field: "username".to_string(),
        });
      }
    }
    let Some(user) = tables.users.get_mut(&id) else {
      return Ok(None);
    };
    if let Some(username) = changes.username {
      user.username = username;
    }
    if let Some(password_hash) = changes.password_hash {
      user.password_hash = password_hash;
    }
    user.updated_at = Utc::now();
    Ok(Some(user.clone()))
  }

  async fn update_user_balance(&self, id: Uuid, balance: i64) -> StoreResult<u64> {
    let mut tables = self.tables.write();
    match tables.users.get_mut(&id) {
      Some(user) => {
        user.balance = balance;
        user.updated_at = Utc::now();
        Ok(1)
      }
      None => Ok(0),
    }
  }

  async fn credit_user_balance(&self, id: Uuid, amount: i64) -> StoreResult<Option<i64>> {
    let mut tables = self.tables.write();
    let Some(user) = tables.users.get_mut(&id) else {
      return Ok(None);
    };
    user.balance = user
      .balance
      .checked_add(amount)
      .ok_or_else(|| StoreError::backend(anyhow::anyhow!("balance overflow for user {}", id)))?;
    user.updated_at = Utc::now();
    Ok(Some(user.balance))
  }

  async fn delete_user(&self, id: Uuid) -> StoreResult<u64> {
    let mut tables = self.tables.write();
    if tables.users.remove(&id).is_none() {
      return Ok(0);
    }
    tables.products.retain(|_, p| p.seller_id != id);
    Ok(1)
  }
}

#[async_trait]
impl ProductStore for MemoryStore {
  #[instrument(name = "memory_store::create_product", skip(self, new_product), err(Display))]
  async fn create_product(&self, seller_id: Uuid, new_product: NewProduct) -> StoreResult<Product> {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: new_product.name,
      cost: new_product.cost,
      quantity: new_product.quantity,
      seller_id,
      created_at: now,
      updated_at: now,
    };
    self.tables.write().products.insert(product.id, product.clone());
    Ok(product)
  }

  async fn find_product_by_id(&self, id: Uuid) -> StoreResult<Option<Product>> {
    Ok(self.tables.read().products.get(&id).cloned())
  }

  async fn find_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
    let mut products: Vec<Product> = self
      .tables
      .read()
      .products
      .values()
      .filter(|p| filter.matches(p))
      .cloned()
      .collect();
    products.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
    Ok(products)
  }

  async fn update_product(&self, id: Uuid, changes: ProductChanges) -> StoreResult<u64> {
    let mut tables = self.tables.write();
    let Some(product) = tables.products.get_mut(&id) else {
      return Ok(0);
    };
    if let Some(name) = changes.name {
      product.name = name;
    }
    if let Some(cost) = changes.cost {
      product.cost = cost;
    }
    if let Some(quantity) = changes.quantity {
      product.quantity = quantity;
    }
    product.updated_at = Utc::now();
    Ok(1)
  }

  async fn update_product_quantity(&self, id: Uuid, quantity: i32) -> StoreResult<u64> {
    let mut tables = self.tables.write();
    match tables.products.get_mut(&id) {
      Some(product) => {
        product.quantity = quantity;
        product.updated_at = Utc::now();
        Ok(1)
      }
      None => Ok(0),
    }
  }

  async fn delete_product(&self, id: Uuid) -> StoreResult<u64> {
    Ok(u64::from(self.tables.write().products.remove(&id).is_some()))
  }
}

#[async_trait]
impl SettlementStore for MemoryStore {
  #[instrument(
    name = "memory_store::settle_purchase",
    skip(self, order),
    fields(buyer_id = %order.buyer_id, product_id = %order.product_id, quantity = order.quantity, total = order.total)
  )]
  async fn settle_purchase(&self, order: SettlementOrder) -> StoreResult<SettlementOutcome> {
    let mut tables = self.tables.write();

    let available_stock = match tables.products.get(&order.product_id) {
      Some(product) => product.quantity,
      None => return Ok(SettlementOutcome::ProductMissing),
    };
    if available_stock < order.quantity {
      return Ok(SettlementOutcome::InsufficientStock {
        available: available_stock,
      });
    }
    let available_balance = match tables.users.get(&order.buyer_id) {
      Some(buyer) => buyer.balance,
      None => return Ok(SettlementOutcome::BuyerMissing),
    };
    if available_balance < order.total {
      return Ok(SettlementOutcome::InsufficientFunds {
        available: available_balance,
      });
    }

    // All conditions hold under this guard; apply both writes.
    let now = Utc::now();
    let stock = {
      let product = tables
        .products
        .get_mut(&order.product_id)
        .ok_or_else(|| StoreError::backend(anyhow::anyhow!("product vanished under write lock")))?;
      product.quantity -= order.quantity;
      product.updated_at = now;
      product.quantity
    };
    let balance = {
      let buyer = tables
        .users
        .get_mut(&order.buyer_id)
        .ok_or_else(|| StoreError::backend(anyhow::anyhow!("buyer vanished under write lock")))?;
      buyer.balance -= order.total;
      buyer.updated_at = now;
      buyer.balance
    };
    debug!(balance, stock, "Settlement applied.");
    Ok(SettlementOutcome::Settled { balance, stock })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Role;

  fn new_user(name: &str, role: Role) -> NewUser {
    NewUser {
      username: name.to_string(),
      password_hash: "hash".to_string(),
      role,
    }
  }

  #[tokio::test]
  async fn usernames_are_unique() {
    let store = MemoryStore::new();
    store.create_user(new_user("alice", Role::Buyer)).await.unwrap();
    let err = store.create_user(new_user("alice", Role::Seller)).await.unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation { ref field } if field == "username"));
  }

  #[tokio::test]
  async fn deleting_a_seller_removes_their_products() {
    let store = MemoryStore::new();
    let seller = store.create_user(new_user("sam", Role::Seller)).await.unwrap();
    store
      .create_product(
        seller.id,
        NewProduct {
          name: "Cola".to_string(),
          cost: 5,
          quantity: 3,
        },
      )
      .await
      .unwrap();
    assert_eq!(store.delete_user(seller.id).await.unwrap(), 1);
    assert!(store.find_products(&ProductFilter::default()).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn settlement_rechecks_stock_and_writes_nothing_on_failure() {
    let store = MemoryStore::new();
    let seller = store.create_user(new_user("sam", Role::Seller)).await.unwrap();
    let buyer = store.create_user(new_user("bob", Role::Buyer)).await.unwrap();
    store.update_user_balance(buyer.id, 100).await.unwrap();
    let product = store
      .create_product(
        seller.id,
        NewProduct {
          name: "Cola".to_string(),
          cost: 10,
          quantity: 1,
        },
      )
      .await
      .unwrap();

    let order = SettlementOrder {
      buyer_id: buyer.id,
      product_id: product.id,
      quantity: 2,
      total: 20,
    };
    let outcome = store.settle_purchase(order).await.unwrap();
    assert_eq!(outcome, SettlementOutcome::InsufficientStock { available: 1 });
    assert_eq!(store.find_user_by_id(buyer.id).await.unwrap().unwrap().balance, 100);
    assert_eq!(store.find_product_by_id(product.id).await.unwrap().unwrap().quantity, 1);
  }
}
