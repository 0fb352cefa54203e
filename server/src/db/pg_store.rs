// server/src/db/pg_store.rs

//! Postgres-backed store. Runtime queries only; rows are converted into domain records.

use crate::models::{ProductRow, UserRow, PRODUCT_COLUMNS, USER_COLUMNS};
use async_trait::async_trait;
use coinslot::{
  NewProduct, NewUser, Product, ProductChanges, ProductFilter, ProductStore, SettlementOrder, SettlementOutcome,
  SettlementStore, StoreError, StoreResult, User, UserChanges, UserStore,
};
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Store over a shared `PgPool`. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Unique-key violations become `StoreError::UniqueViolation` named after the
/// offending column; everything else is an opaque backend failure.
fn map_sqlx(err: sqlx::Error) -> StoreError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.is_unique_violation() {
      let field = match db_err.constraint() {
        Some(c) if c.contains("username") => "username",
        Some(c) => c,
        None => "unknown",
      };
      return StoreError::UniqueViolation {
        field: field.to_string(),
      };
    }
  }
  StoreError::backend(err)
}

#[async_trait]
impl UserStore for PgStore {
  #[instrument(name = "pg_store::create_user", skip(self, new_user), fields(username = %new_user.username), err(Display))]
  async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
    let sql = format!(
      "INSERT INTO users (id, username, password_hash, balance, role) VALUES ($1, $2, $3, 0, $4) RETURNING {}",
      USER_COLUMNS
    );
    let row = sqlx::query_as::<_, UserRow>(&sql)
      .bind(Uuid::new_v4())
      .bind(&new_user.username)
      .bind(&new_user.password_hash)
      .bind(new_user.role.as_str())
      .fetch_one(&self.pool)
      .await
      .map_err(map_sqlx)?;
    User::try_from(row)
  }

  async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    sqlx::query_as::<_, UserRow>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx)?
      .map(User::try_from)
      .transpose()
  }

  async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
    sqlx::query_as::<_, UserRow>(&sql)
      .bind(username)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx)?
      .map(User::try_from)
      .transpose()
  }

  async fn find_users(&self) -> StoreResult<Vec<User>> {
    let sql = format!("SELECT {} FROM users ORDER BY username ASC", USER_COLUMNS);
    sqlx::query_as::<_, UserRow>(&sql)
      .fetch_all(&self.pool)
      .await
      .map_err(map_sqlx)?
      .into_iter()
      .map(User::try_from)
      .collect()
  }

  #[instrument(name = "pg_store::update_user", skip(self, changes), err(Display))]
  async fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
    // NULL binds keep the current value.
    let sql = format!(
      "UPDATE users SET username = COALESCE($2, username), password_hash = COALESCE($3, password_hash), \
       updated_at = NOW() WHERE id = $1 RETURNING {}",
      USER_COLUMNS
    );
    sqlx::query_as::<_, UserRow>(&sql)
      .bind(id)
      .bind(changes.username)
      .bind(changes.password_hash)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx)?
      .map(User::try_from)
      .transpose()
  }

  async fn update_user_balance(&self, id: Uuid, balance: i64) -> StoreResult<u64> {
    let result = sqlx::query("UPDATE users SET balance = $2, updated_at = NOW() WHERE id = $1")
      .bind(id)
      .bind(balance)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx)?;
    Ok(result.rows_affected())
  }

  #[instrument(name = "pg_store::credit_user_balance", skip(self), err(Display))]
  async fn credit_user_balance(&self, id: Uuid, amount: i64) -> StoreResult<Option<i64>> {
    // Single statement, so concurrent deposits never lose an update.
    sqlx::query_scalar::<_, i64>(
      "UPDATE users SET balance = balance + $2, updated_at = NOW() WHERE id = $1 RETURNING balance",
    )
    .bind(id)
    .bind(amount)
    .fetch_optional(&self.pool)
    .await
    .map_err(map_sqlx)
  }

  async fn delete_user(&self, id: Uuid) -> StoreResult<u64> {
    // products.seller_id cascades.
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx)?;
    Ok(result.rows_affected())
  }
}

#[async_trait]
impl ProductStore for PgStore {
  #[instrument(name = "pg_store::create_product", skip(self, new_product), err(Display))]
  async fn create_product(&self, seller_id: Uuid, new_product: NewProduct) -> StoreResult<Product> {
    let sql = format!(
      "INSERT INTO products (id, name, cost, quantity, seller_id) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
      PRODUCT_COLUMNS
    );
    let row = sqlx::query_as::<_, ProductRow>(&sql)
      .bind(Uuid::new_v4())
      .bind(&new_product.name)
      .bind(new_product.cost)
      .bind(new_product.quantity)
      .bind(seller_id)
      .fetch_one(&self.pool)
      .await
      .map_err(map_sqlx)?;
    Ok(row.into())
  }

  async fn find_product_by_id(&self, id: Uuid) -> StoreResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
    let row = sqlx::query_as::<_, ProductRow>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_sqlx)?;
    Ok(row.map(Product::from))
  }

  async fn find_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
    // An absent filter field binds NULL and matches every row.
    let sql = format!(
      "SELECT {} FROM products WHERE ($1::uuid IS NULL OR seller_id = $1) AND ($2::text IS NULL OR name = $2) \
       ORDER BY name ASC, created_at ASC",
      PRODUCT_COLUMNS
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
      .bind(filter.seller_id)
      .bind(filter.name.as_deref())
      .fetch_all(&self.pool)
      .await
      .map_err(map_sqlx)?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  #[instrument(name = "pg_store::update_product", skip(self, changes), err(Display))]
  async fn update_product(&self, id: Uuid, changes: ProductChanges) -> StoreResult<u64> {
    let result = sqlx::query(
      "UPDATE products SET name = COALESCE($2, name), cost = COALESCE($3, cost), \
       quantity = COALESCE($4, quantity), updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.cost)
    .bind(changes.quantity)
    .execute(&self.pool)
    .await
    .map_err(map_sqlx)?;
    Ok(result.rows_affected())
  }

  async fn update_product_quantity(&self, id: Uuid, quantity: i32) -> StoreResult<u64> {
    let result = sqlx::query("UPDATE products SET quantity = $2, updated_at = NOW() WHERE id = $1")
      .bind(id)
      .bind(quantity)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx)?;
    Ok(result.rows_affected())
  }

  async fn delete_product(&self, id: Uuid) -> StoreResult<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(map_sqlx)?;
    Ok(result.rows_affected())
  }
}

#[async_trait]
impl SettlementStore for PgStore {
  /// Both conditional updates run in one transaction. A zero-row update means the
  /// precondition no longer holds; the transaction is rolled back and the current
  /// value is reported.
  #[instrument(
    name = "pg_store::settle_purchase",
    skip(self, order),
    fields(buyer_id = %order.buyer_id, product_id = %order.product_id, quantity = order.quantity, total = order.total)
  )]
  async fn settle_purchase(&self, order: SettlementOrder) -> StoreResult<SettlementOutcome> {
    let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

    let stock = sqlx::query_scalar::<_, i32>(
      "UPDATE products SET quantity = quantity - $1, updated_at = NOW() \
       WHERE id = $2 AND quantity >= $1 RETURNING quantity",
    )
    .bind(order.quantity)
    .bind(order.product_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(map_sqlx)?;

    let Some(stock) = stock else {
      let available = sqlx::query_scalar::<_, i32>("SELECT quantity FROM products WHERE id = $1")
        .bind(order.product_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx)?;
      tx.rollback().await.map_err(map_sqlx)?;
      warn!(?available, "Stock precondition failed at commit.");
      return Ok(match available {
        Some(available) => SettlementOutcome::InsufficientStock { available },
        None => SettlementOutcome::ProductMissing,
      });
    };

    let balance = sqlx::query_scalar::<_, i64>(
      "UPDATE users SET balance = balance - $1, updated_at = NOW() \
       WHERE id = $2 AND balance >= $1 RETURNING balance",
    )
    .bind(order.total)
    .bind(order.buyer_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(map_sqlx)?;

    let Some(balance) = balance else {
      let available = sqlx::query_scalar::<_, i64>("SELECT balance FROM users WHERE id = $1")
        .bind(order.buyer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx)?;
      // Undoes the stock decrement above.
      tx.rollback().await.map_err(map_sqlx)?;
      warn!(?available, "Balance precondition failed at commit.");
      return Ok(match available {
        Some(available) => SettlementOutcome::InsufficientFunds { available },
        None => SettlementOutcome::BuyerMissing,
      });
    };

    tx.commit().await.map_err(map_sqlx)?;
    debug!(balance, stock, "Settlement committed.");
    Ok(SettlementOutcome::Settled { balance, stock })
  }
}
