// server/src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use coinslot::services::users;
use coinslot::{NewUser, UserChanges};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::dtos::{validated, LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest};
use crate::web::extractors::AuthenticatedUser;

/// Creates an account with a zero balance.
///
/// # Returns
/// `201` with the new user (without its password hash), or `409` when the
/// username is already taken.
#[instrument(
    name = "handler::register",
    skip(app_state, req_payload),
    fields(username = %req_payload.username, role = %req_payload.role)
)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
  let request = validated(req_payload)?;
  let password_hash = auth_service::hash_password(&request.password)?;
  let user = users::register(
    app_state.store.as_ref(),
    NewUser {
      username: request.username,
      password_hash,
      role: request.role,
    },
  )
  .await?;
  info!(user_id = %user.id, "Registration successful.");
  Ok(HttpResponse::Created().json(user))
}

/// Exchanges a username and password for a bearer token.
///
/// # Returns
/// `200` with `{token, userId}`; `401` for any credential mismatch.
#[instrument(name = "handler::login", skip(app_state, req_payload), fields(username = %req_payload.username))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
  let request = validated(req_payload)?;
  // Same answer for an unknown user and a wrong password.
  let invalid = || AppError::Auth("Invalid username or password.".to_string());

  let user = users::find_by_username(app_state.store.as_ref(), &request.username)
    .await?
    .ok_or_else(|| {
      warn!("Login attempt for unknown username.");
      invalid()
    })?;
  if !auth_service::verify_password(&user.password_hash, &request.password)? {
    warn!(user_id = %user.id, "Login attempt with wrong password.");
    return Err(invalid());
  }

  let token = app_state.tokens.issue(&user)?;
  info!(user_id = %user.id, "Login successful.");
  Ok(HttpResponse::Ok().json(LoginResponse { token, user_id: user.id }))
}

#[instrument(name = "handler::list_users", skip(app_state, _auth))]
pub async fn list_users_handler(app_state: web::Data<AppState>, _auth: AuthenticatedUser) -> Result<HttpResponse> {
  let all = users::list_users(app_state.store.as_ref()).await?;
  Ok(HttpResponse::Ok().json(all))
}

#[instrument(name = "handler::get_user", skip(app_state, _auth, path), fields(user_id = %path.as_ref()))]
pub async fn get_user_handler(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  let user = users::get_user(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(user))
}

/// Changes the caller's own username or password. Role and balance are not
/// accepted here; deposits and purchases are the only ways to move a balance.
#[instrument(
    name = "handler::update_user",
    skip(app_state, auth, path, req_payload),
    fields(user_id = %path.as_ref(), actor_id = %auth.0.id)
)]
pub async fn update_user_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
  let request = validated(req_payload)?;
  // A new password is stored hashed like at registration.
  let password_hash = request
    .password
    .as_deref()
    .map(auth_service::hash_password)
    .transpose()?;
  let changes = UserChanges {
    username: request.username,
    password_hash,
  };
  let user = users::update_user(app_state.store.as_ref(), &auth.0, path.into_inner(), changes).await?;
  Ok(HttpResponse::Ok().json(user))
}

/// Deletes the caller's own account together with the products it sells.
#[instrument(
    name = "handler::delete_user",
    skip(app_state, auth, path),
    fields(user_id = %path.as_ref(), actor_id = %auth.0.id)
)]
pub async fn delete_user_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  users::delete_user(app_state.store.as_ref(), &auth.0, path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
