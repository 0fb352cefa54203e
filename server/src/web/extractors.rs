// server/src/web/extractors.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use coinslot::services::users;
use coinslot::{User, VendingError};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// The caller identified by a valid bearer token, loaded fresh from the store.
///
/// Extraction fails with 401 when the header is missing or malformed, when the
/// token does not verify, or when its user no longer exists.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
  let value = req
    .headers()
    .get(header::AUTHORIZATION)
    .ok_or_else(|| AppError::Auth("Missing bearer token.".to_string()))?
    .to_str()
    .map_err(|_| AppError::Auth("Malformed Authorization header.".to_string()))?;
  match value.split_once(' ') {
    Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
      Ok(token.trim().to_string())
    }
    _ => Err(AppError::Auth("Malformed Authorization header.".to_string())),
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = bearer_token(req);

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let token = token.map_err(|e| {
        warn!(error = %e, "AuthenticatedUser extractor: rejected request.");
        e
      })?;
      let claims = state.tokens.verify(&token)?;
      let user_id = claims.user_id()?;
      match users::get_user(state.store.as_ref(), user_id).await {
        Ok(user) => Ok(AuthenticatedUser(user)),
        Err(VendingError::UserNotFound) => {
          warn!(%user_id, "Token refers to a deleted user.");
          Err(AppError::Auth("Token refers to a user that no longer exists.".to_string()))
        }
        Err(other) => Err(AppError::from(other)),
      }
    })
  }
}
