// server/src/web/handlers/vending_handlers.rs

//! Buyer-facing machine operations: coin deposit, balance reset and purchase.
//!
//! Every handler takes `AuthenticatedUser` before the body extractor. Actix runs
//! extractors in argument order, so an unauthenticated request is answered with
//! 401 before its payload is parsed.

use actix_web::{web, HttpResponse};
use coinslot::{deposit, purchase, reset_balance};
use tracing::{info, instrument};

use crate::errors::Result;
use crate::state::AppState;
use crate::web::dtos::{validated, BuyRequest, DepositRequest, MessageResponse};
use crate::web::extractors::AuthenticatedUser;

/// Adds one accepted coin to the caller's balance.
///
/// # Returns
/// `200` with a message echoing the coin and the new balance.
#[instrument(
    name = "handler::deposit",
    skip(app_state, auth, req_payload),
    fields(buyer_id = %auth.0.id, amount = req_payload.amount)
)]
pub async fn deposit_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  req_payload: web::Json<DepositRequest>,
) -> Result<HttpResponse> {
  let request = validated(req_payload)?;
  let balance = deposit(app_state.store.as_ref(), &auth.0, request.amount).await?;
  Ok(HttpResponse::Ok().json(MessageResponse {
    message: format!(
      "your deposit is {} and you currently have {}",
      request.amount, balance
    ),
  }))
}

/// Sets the caller's balance back to zero.
#[instrument(name = "handler::reset", skip(app_state, auth), fields(buyer_id = %auth.0.id))]
pub async fn reset_handler(app_state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse> {
  reset_balance(app_state.store.as_ref(), &auth.0).await?;
  Ok(HttpResponse::Ok().json(MessageResponse {
    message: "your deposit is reset".to_string(),
  }))
}

/// Buys `quantity` units of a product with the caller's balance.
///
/// # Returns
/// `200` with the settlement (total spent, product name, quantity and change).
/// Stock or balance shortfalls come back as `400` with nothing written.
#[instrument(
    name = "handler::buy",
    skip(app_state, auth, req_payload),
    fields(buyer_id = %auth.0.id, product_id = %req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn buy_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  req_payload: web::Json<BuyRequest>,
) -> Result<HttpResponse> {
  let request = validated(req_payload)?;
  let settlement = purchase(app_state.store.as_ref(), &auth.0, request.product_id, request.quantity).await?;
  info!(total_spent = settlement.total_spent, change = settlement.change, "Purchase completed.");
  Ok(HttpResponse::Ok().json(settlement))
}
