// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::model::Role;

/// Failure raised by a store implementation.
///
/// Use-cases never inspect `Backend`; it is carried up to the caller unchanged
/// so connectivity and timeout problems surface as an opaque internal failure.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Unique constraint violated on '{field}'")]
  UniqueViolation { field: String },

  #[error("Store backend failure. Source: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },
}

impl StoreError {
  pub fn backend(err: impl Into<AnyhowError>) -> Self {
    StoreError::Backend { source: err.into() }
  }
}

/// Domain errors signaled by the use-cases. None of them are retried.
#[derive(Debug, Error)]
pub enum VendingError {
  #[error("Product not found")]
  ProductNotFound,

  #[error("User not found")]
  UserNotFound,

  #[error("Insufficient stock: requested {requested}, available {available}")]
  InsufficientStock { requested: i32, available: i32 },

  #[error("Insufficient funds: required {required}, available {available}")]
  InsufficientFunds { required: i64, available: i64 },

  #[error("Operation requires the '{required}' role")]
  RoleNotPermitted { required: Role },

  #[error("Only the owning seller may modify this product")]
  NotProductOwner,

  #[error("Operation not permitted on another user's account")]
  Forbidden,

  #[error("Deposit amount {0} is not one of the accepted denominations")]
  InvalidDepositAmount(i64),

  #[error("Quantity must be a positive integer, got {0}")]
  InvalidQuantity(i32),

  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Username '{0}' is already taken")]
  UsernameTaken(String),

  #[error("Store error: {source}")]
  Store {
    #[from]
    source: StoreError,
  },
}

impl VendingError {
  /// Stable, machine-readable identifier sent to API clients.
  pub fn code(&self) -> &'static str {
    match self {
      VendingError::ProductNotFound => "PRODUCT_NOT_FOUND",
      VendingError::UserNotFound => "USER_NOT_FOUND",
      VendingError::InsufficientStock { .. } => "PRODUCT_INSUFFICIENT_QUANTITY",
      VendingError::InsufficientFunds { .. } => "USER_INSUFFICIENT_DEPOSIT",
      VendingError::RoleNotPermitted { .. } => "USER_INSUFFICIENT_TYPE",
      VendingError::NotProductOwner => "PRODUCT_INSUFFICIENT_OWNER",
      VendingError::Forbidden => "FORBIDDEN",
      VendingError::InvalidDepositAmount(_) => "INVALID_DEPOSIT_AMOUNT",
      VendingError::InvalidQuantity(_) => "INVALID_QUANTITY",
      VendingError::Validation(_) => "VALIDATION_ERROR",
      VendingError::UsernameTaken(_) => "USERNAME_TAKEN",
      VendingError::Store { .. } => "INTERNAL_SERVER_ERROR",
    }
  }

  /// True for failures caused by the caller's input or the current domain state,
  /// as opposed to infrastructure failures.
  pub fn is_domain(&self) -> bool {
    !matches!(self, VendingError::Store { .. })
  }
}

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;
pub type VendingResult<T, E = VendingError> = std::result::Result<T, E>;
