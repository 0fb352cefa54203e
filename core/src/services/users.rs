// core/src/services/users.rs

//! User accessors: registration, lookup and self-service account changes.

use crate::error::{StoreError, VendingError, VendingResult};
use crate::model::{NewUser, User, UserChanges};
use crate::store::UserStore;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const USERNAME_MAX_LEN: usize = 64;

fn validate_username(username: &str) -> VendingResult<()> {
  let trimmed = username.trim();
  if trimmed.is_empty() {
    return Err(VendingError::Validation("username must not be empty".to_string()));
  }
  if trimmed.len() != username.len() {
    return Err(VendingError::Validation(
      "username must not start or end with whitespace".to_string(),
    ));
  }
  if username.chars().count() > USERNAME_MAX_LEN {
    return Err(VendingError::Validation(format!(
      "username must be at most {} characters",
      USERNAME_MAX_LEN
    )));
  }
  Ok(())
}

fn map_unique(err: StoreError, username: &str) -> VendingError {
  match err {
    StoreError::UniqueViolation { .. } => VendingError::UsernameTaken(username.to_string()),
    other => VendingError::from(other),
  }
}

#[instrument(name = "users::register", skip(store, new_user), fields(username = %new_user.username, role = %new_user.role), err(Display))]
pub async fn register<S>(store: &S, new_user: NewUser) -> VendingResult<User>
where
  S: UserStore + ?Sized,
{
  validate_username(&new_user.username)?;
  if store.find_user_by_username(&new_user.username).await?.is_some() {
    warn!("Attempt to register an existing username.");
    return Err(VendingError::UsernameTaken(new_user.username));
  }
  let username = new_user.username.clone();
  // The unique constraint still guards against a concurrent registration.
  let user = store
    .create_user(new_user)
    .await
    .map_err(|e| map_unique(e, &username))?;
  info!(user_id = %user.id, "User registered.");
  Ok(user)
}

pub async fn get_user<S>(store: &S, id: Uuid) -> VendingResult<User>
where
  S: UserStore + ?Sized,
{
  store.find_user_by_id(id).await?.ok_or(VendingError::UserNotFound)
}

pub async fn find_by_username<S>(store: &S, username: &str) -> VendingResult<Option<User>>
where
  S: UserStore + ?Sized,
{
  Ok(store.find_user_by_username(username).await?)
}

pub async fn list_users<S>(store: &S) -> VendingResult<Vec<User>>
where
  S: UserStore + ?Sized,
{
  Ok(store.find_users().await?)
}

/// Updates the actor's own account. Only the username and password hash can change.
#[instrument(name = "users::update_user", skip(store, actor, changes), fields(actor_id = %actor.id, %target_id), err(Display))]
pub async fn update_user<S>(store: &S, actor: &User, target_id: Uuid, changes: UserChanges) -> VendingResult<User>
where
  S: UserStore + ?Sized,
{
  if actor.id != target_id {
    return Err(VendingError::Forbidden);
  }
  if changes.is_empty() {
    return Err(VendingError::Validation(
      "at least one of username or password must be provided".to_string(),
    ));
  }
  if let Some(username) = changes.username.as_deref() {
    validate_username(username)?;
  }
  let requested_username = changes.username.clone().unwrap_or_default();
  store
    .update_user(target_id, changes)
    .await
    .map_err(|e| map_unique(e, &requested_username))?
    .ok_or(VendingError::UserNotFound)
}

/// Deletes the actor's own account together with any products they sell.
#[instrument(name = "users::delete_user", skip(store, actor), fields(actor_id = %actor.id, %target_id), err(Display))]
pub async fn delete_user<S>(store: &S, actor: &User, target_id: Uuid) -> VendingResult<()>
where
  S: UserStore + ?Sized,
{
  if actor.id != target_id {
    return Err(VendingError::Forbidden);
  }
  if store.delete_user(target_id).await? == 0 {
    return Err(VendingError::UserNotFound);
  }
  info!("User deleted.");
  Ok(())
}
