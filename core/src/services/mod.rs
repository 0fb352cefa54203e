// core/src/services/mod.rs

//! Use-cases. Every entry point takes the authenticated user explicitly; there is
//! no ambient session state.

pub mod products;
pub mod purchase;
pub mod users;
pub mod wallet;

use crate::error::{VendingError, VendingResult};
use crate::model::{Role, User};
use tracing::warn;

/// Fails with `RoleNotPermitted` unless `actor` holds `required`.
pub fn require_role(actor: &User, required: Role) -> VendingResult<()> {
  if actor.role != required {
    warn!(user_id = %actor.id, actual = %actor.role, %required, "Role check failed.");
    return Err(VendingError::RoleNotPermitted { required });
  }
  Ok(())
}
