// core/src/store/mod.rs

//! Persistence contract used by the use-cases.
//!
//! Implementations provide single-record reads and writes for users and
//! products, plus one cross-record primitive, [`SettlementStore::settle_purchase`],
//! which must apply the balance debit and the stock decrement together or not at all.

pub mod memory;

use crate::error::StoreResult;
use crate::model::{NewProduct, NewUser, Product, ProductChanges, ProductFilter, User, UserChanges};
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;

#[async_trait]
pub trait UserStore: Send + Sync {
  async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;

  async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

  async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

  async fn find_users(&self) -> StoreResult<Vec<User>>;

  /// Applies `changes` and returns the updated record, or `None` if the user does not exist.
  async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>>;

  /// Overwrites the balance. Returns the number of modified records.
  async fn update_user_balance(&self, id: Uuid, balance: i64) -> StoreResult<u64>;

  /// Atomically adds `amount` to the balance and returns the new balance,
  /// or `None` if the user does not exist.
  async fn credit_user_balance(&self, id: Uuid, amount: i64) -> StoreResult<Option<i64>>;

  /// Deletes the user and the products they sell. Returns the number of deleted users.
  async fn delete_user(&self, id: Uuid) -> StoreResult<u64>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  async fn create_product(&self, seller_id: Uuid, new_product: NewProduct) -> StoreResult<Product>;

  async fn find_product_by_id(&self, id: Uuid) -> StoreResult<Option<Product>>;

  /// Products matching `filter`, ordered by name.
  async fn find_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;

  /// Returns the number of modified records.
  async fn update_product(&self, id: Uuid, changes: ProductChanges) -> StoreResult<u64>;

  /// Overwrites the stock level. Returns the number of modified records.
  ///
  /// Seller-side restock primitive; purchases never call it and go through
  /// [`SettlementStore::settle_purchase`] instead.
  async fn update_product_quantity(&self, id: Uuid, quantity: i32) -> StoreResult<u64>;

  /// Returns the number of deleted records.
  async fn delete_product(&self, id: Uuid) -> StoreResult<u64>;
}

/// A purchase ready to be committed: all preconditions were checked by the caller
/// against a possibly stale read, and the store re-checks them at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOrder {
  pub buyer_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  /// `cost * quantity`, debited from the buyer.
  pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
  /// Both writes applied. Carries the values left after the settlement.
  Settled { balance: i64, stock: i32 },
  /// Stock fell below the requested quantity. Nothing was written.
  InsufficientStock { available: i32 },
  /// Balance fell below the total. Nothing was written.
  InsufficientFunds { available: i64 },
  ProductMissing,
  BuyerMissing,
}

#[async_trait]
pub trait SettlementStore: Send + Sync {
  async fn settle_purchase(&self, order: SettlementOrder) -> StoreResult<SettlementOutcome>;
}

/// Everything the HTTP layer needs from one backend.
pub trait Store: UserStore + ProductStore + SettlementStore {}

impl<T> Store for T where T: UserStore + ProductStore + SettlementStore {}
