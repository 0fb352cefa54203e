// core/src/services/products.rs

//! Product accessors. Sellers create products; only the owning seller may change or remove them.

use crate::error::{VendingError, VendingResult};
use crate::model::{NewProduct, Product, ProductChanges, ProductFilter, Role, User};
use crate::services::require_role;
use crate::store::ProductStore;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const PRODUCT_NAME_MAX_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Modified {
  pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
  pub deleted_count: u64,
}

fn validate_name(name: &str) -> VendingResult<()> {
  if name.trim().is_empty() {
    return Err(VendingError::Validation("name is required".to_string()));
  }
  if name.chars().count() > PRODUCT_NAME_MAX_LEN {
    return Err(VendingError::Validation(format!(
      "name must be at most {} characters",
      PRODUCT_NAME_MAX_LEN
    )));
  }
  Ok(())
}

fn validate_cost(cost: i64) -> VendingResult<()> {
  if cost <= 0 {
    return Err(VendingError::Validation("cost must be positive".to_string()));
  }
  Ok(())
}

fn validate_quantity(quantity: i32) -> VendingResult<()> {
  if quantity < 0 {
    return Err(VendingError::Validation("quantity must not be negative".to_string()));
  }
  Ok(())
}

/// Loads the product and checks that `actor` sells it.
async fn owned_product<S>(store: &S, actor: &User, id: Uuid) -> VendingResult<Product>
where
  S: ProductStore + ?Sized,
{
  let product = store.find_product_by_id(id).await?.ok_or(VendingError::ProductNotFound)?;
  if product.seller_id != actor.id {
    warn!(actor_id = %actor.id, seller_id = %product.seller_id, "Ownership check failed.");
    return Err(VendingError::NotProductOwner);
  }
  Ok(product)
}

#[instrument(name = "products::create_product", skip(store, seller, new_product), fields(seller_id = %seller.id, name = %new_product.name), err(Display))]
pub async fn create_product<S>(store: &S, seller: &User, new_product: NewProduct) -> VendingResult<Product>
where
  S: ProductStore + ?Sized,
{
  require_role(seller, Role::Seller)?;
  validate_name(&new_product.name)?;
  validate_cost(new_product.cost)?;
  validate_quantity(new_product.quantity)?;
  let product = store.create_product(seller.id, new_product).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(product)
}

pub async fn get_product<S>(store: &S, id: Uuid) -> VendingResult<Product>
where
  S: ProductStore + ?Sized,
{
  store.find_product_by_id(id).await?.ok_or(VendingError::ProductNotFound)
}

pub async fn list_products<S>(store: &S, filter: &ProductFilter) -> VendingResult<Vec<Product>>
where
  S: ProductStore + ?Sized,
{
  Ok(store.find_products(filter).await?)
}

#[instrument(name = "products::update_product", skip(store, actor, changes), fields(actor_id = %actor.id, %id), err(Display))]
pub async fn update_product<S>(store: &S, actor: &User, id: Uuid, changes: ProductChanges) -> VendingResult<Modified>
where
  S: ProductStore + ?Sized,
{
  if changes.is_empty() {
    return Err(VendingError::Validation(
      "at least one of name, cost, or quantity must be provided".to_string(),
    ));
  }
  if let Some(name) = changes.name.as_deref() {
    validate_name(name)?;
  }
  if let Some(cost) = changes.cost {
    validate_cost(cost)?;
  }
  if let Some(quantity) = changes.quantity {
    validate_quantity(quantity)?;
  }
  owned_product(store, actor, id).await?;
  let modified_count = store.update_product(id, changes).await?;
  Ok(Modified { modified_count })
}

#[instrument(name = "products::delete_product", skip(store, actor), fields(actor_id = %actor.id, %id), err(Display))]
pub async fn delete_product<S>(store: &S, actor: &User, id: Uuid) -> VendingResult<Deleted>
where
  S: ProductStore + ?Sized,
{
  owned_product(store, actor, id).await?;
  let deleted_count = store.delete_product(id).await?;
  if deleted_count == 0 {
    return Err(VendingError::ProductNotFound);
  }
  info!("Product deleted.");
  Ok(Deleted { deleted_count })
}
