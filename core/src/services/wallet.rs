// core/src/services/wallet.rs

use crate::error::{VendingError, VendingResult};
use crate::model::{Role, User};
use crate::services::require_role;
use crate::store::UserStore;
use tracing::{info, instrument};

/// Top-up amounts the machine accepts.
pub const DEPOSIT_DENOMINATIONS: [i64; 5] = [5, 10, 20, 50, 100];

pub fn is_accepted_denomination(amount: i64) -> bool {
  DEPOSIT_DENOMINATIONS.contains(&amount)
}

/// Adds `amount` to the buyer's balance and returns the new balance.
#[instrument(name = "wallet::deposit", skip(store, buyer), fields(buyer_id = %buyer.id, amount), err(Display))]
pub async fn deposit<S>(store: &S, buyer: &User, amount: i64) -> VendingResult<i64>
where
  S: UserStore + ?Sized,
{
  require_role(buyer, Role::Buyer)?;
  if !is_accepted_denomination(amount) {
    return Err(VendingError::InvalidDepositAmount(amount));
  }
  let balance = store
    .credit_user_balance(buyer.id, amount)
    .await?
    .ok_or(VendingError::UserNotFound)?;
  info!(balance, "Deposit credited.");
  Ok(balance)
}

/// Sets the buyer's balance to zero.
#[instrument(name = "wallet::reset_balance", skip(store, buyer), fields(buyer_id = %buyer.id), err(Display))]
pub async fn reset_balance<S>(store: &S, buyer: &User) -> VendingResult<()>
where
  S: UserStore + ?Sized,
{
  require_role(buyer, Role::Buyer)?;
  if store.update_user_balance(buyer.id, 0).await? == 0 {
    return Err(VendingError::UserNotFound);
  }
  info!(previous_balance = buyer.balance, "Balance reset.");
  Ok(())
}
