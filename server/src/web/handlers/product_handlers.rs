// server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use coinslot::services::products;
use coinslot::{NewProduct, ProductChanges, ProductFilter};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::Result;
use crate::state::AppState;
use crate::web::dtos::{validated, CreateProductRequest, ListProductsQuery, UpdateProductRequest};
use crate::web::extractors::AuthenticatedUser;

/// Lists a new product owned by the calling seller.
///
/// # Returns
/// `201` with the stored product, or `403` when the caller is a buyer.
#[instrument(
    name = "handler::create_product",
    skip(app_state, auth, req_payload),
    fields(seller_id = %auth.0.id, name = %req_payload.name)
)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  req_payload: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
  let request = validated(req_payload)?;
  let product = products::create_product(
    app_state.store.as_ref(),
    &auth.0,
    NewProduct {
      name: request.name,
      cost: request.cost,
      quantity: request.quantity,
    },
  )
  .await?;
  info!(product_id = %product.id, "Product listed.");
  Ok(HttpResponse::Created().json(product))
}

/// Catalogue, optionally narrowed by `sellerId` and exact `name`, ordered by name.
#[instrument(name = "handler::list_products", skip(app_state, _auth, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedUser,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse> {
  let filter = ProductFilter::from(query_params.into_inner());
  let catalogue = products::list_products(app_state.store.as_ref(), &filter).await?;
  info!("Successfully fetched {} products.", catalogue.len());
  Ok(HttpResponse::Ok().json(catalogue))
}

#[instrument(name = "handler::get_product", skip(app_state, _auth, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  let product = products::get_product(app_state.store.as_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(product))
}

/// Partial update by the owning seller. Responds with `{"modifiedCount": n}`.
#[instrument(
    name = "handler::update_product",
    skip(app_state, auth, path, req_payload),
    fields(product_id = %path.as_ref(), actor_id = %auth.0.id)
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse> {
  let request = validated(req_payload)?;
  let changes = ProductChanges {
    name: request.name,
    cost: request.cost,
    quantity: request.quantity,
  };
  let modified = products::update_product(app_state.store.as_ref(), &auth.0, path.into_inner(), changes).await?;
  Ok(HttpResponse::Ok().json(modified))
}

/// Removal by the owning seller. Responds with `{"deletedCount": n}`.
#[instrument(
    name = "handler::delete_product",
    skip(app_state, auth, path),
    fields(product_id = %path.as_ref(), actor_id = %auth.0.id)
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  let deleted = products::delete_product(app_state.store.as_ref(), &auth.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(deleted))
}
