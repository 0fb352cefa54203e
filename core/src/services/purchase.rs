// core/src/services/purchase.rs

//! The purchase orchestrator: validate stock and funds, then settle.
//!
//! The checks run against the product as read at the start of the request and the
//! buyer record supplied by the caller. Other requests may interleave between those
//! reads and the write, so the store re-checks both conditions when it commits the
//! settlement and reports a lost race with the same errors as the initial checks.

use crate::error::{VendingError, VendingResult};
use crate::model::{Role, User};
use crate::services::require_role;
use crate::store::{ProductStore, SettlementOrder, SettlementOutcome, SettlementStore};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Outcome of a successful purchase, as reported to the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
  /// `cost * quantity`.
  pub total_spent: i64,
  /// Name of the purchased product.
  pub product_purchased: String,
  pub quantity: i32,
  /// The buyer's balance after the debit.
  pub change: i64,
}

#[instrument(
  name = "purchase::purchase",
  skip(store, buyer),
  fields(buyer_id = %buyer.id, %product_id, quantity),
  err(Display)
)]
pub async fn purchase<S>(store: &S, buyer: &User, product_id: Uuid, quantity: i32) -> VendingResult<Settlement>
where
  S: ProductStore + SettlementStore + ?Sized,
{
  require_role(buyer, Role::Buyer)?;
  if quantity <= 0 {
    return Err(VendingError::InvalidQuantity(quantity));
  }

  // 1. Lookup
  let product = store
    .find_product_by_id(product_id)
    .await?
    .ok_or(VendingError::ProductNotFound)?;

  // 2. Stock
  if product.quantity < quantity {
    warn!(available = product.quantity, "Purchase rejected: insufficient stock.");
    return Err(VendingError::InsufficientStock {
      requested: quantity,
      available: product.quantity,
    });
  }

  // 3. Funds. An overflowing total is unaffordable by definition.
  let total = match product.cost.checked_mul(i64::from(quantity)) {
    Some(total) if total <= buyer.balance => total,
    Some(total) => {
      warn!(required = total, available = buyer.balance, "Purchase rejected: insufficient funds.");
      return Err(VendingError::InsufficientFunds {
        required: total,
        available: buyer.balance,
      });
    }
    None => {
      warn!(available = buyer.balance, "Purchase rejected: total overflows.");
      return Err(VendingError::InsufficientFunds {
        required: i64::MAX,
        available: buyer.balance,
      });
    }
  };

  let order = SettlementOrder {
    buyer_id: buyer.id,
    product_id,
    quantity,
    total,
  };
  match store.settle_purchase(order).await? {
    SettlementOutcome::Settled { balance, stock } => {
      info!(total, balance, stock, "Purchase settled.");
      Ok(Settlement {
        total_spent: total,
        product_purchased: product.name,
        quantity,
        change: balance,
      })
    }
    SettlementOutcome::InsufficientStock { available } => {
      warn!(available, "Purchase lost the stock race at commit.");
      Err(VendingError::InsufficientStock {
        requested: quantity,
        available,
      })
    }
    SettlementOutcome::InsufficientFunds { available } => {
      warn!(available, "Purchase lost the balance race at commit.");
      Err(VendingError::InsufficientFunds {
        required: total,
        available,
      })
    }
    SettlementOutcome::ProductMissing => Err(VendingError::ProductNotFound),
    SettlementOutcome::BuyerMissing => Err(VendingError::UserNotFound),
  }
}
