// core/src/lib.rs

//! coinslot: domain core of a small vending-machine service.
//!
//! The crate holds the records (users and products), the store contract, an
//! in-memory store, and the use-cases built on top of them:
//!  - user and product accessors with role and ownership rules,
//!  - deposit and reset of a buyer's balance,
//!  - the purchase orchestrator, which validates stock and funds and then
//!    settles the debit and the decrement atomically.
//!
//! Nothing here knows about HTTP or SQL. The authenticated user is always passed
//! explicitly to the use-cases.

pub mod error;
pub mod model;
pub mod services;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::error::{StoreError, StoreResult, VendingError, VendingResult};
pub use crate::model::{NewProduct, NewUser, Product, ProductChanges, ProductFilter, Role, User, UserChanges};
pub use crate::services::products::{Deleted, Modified};
pub use crate::services::purchase::{purchase, Settlement};
pub use crate::services::wallet::{deposit, reset_balance, DEPOSIT_DENOMINATIONS};
pub use crate::store::{
  MemoryStore, ProductStore, SettlementOrder, SettlementOutcome, SettlementStore, Store, UserStore,
};
