// server/src/models/user.rs

use chrono::{DateTime, Utc};
use coinslot::{Role, StoreError, User};
use sqlx::FromRow;
use uuid::Uuid;

pub const USER_COLUMNS: &str = "id, username, password_hash, balance, role, created_at, updated_at";

/// A `users` row. `role` is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
  pub id: Uuid,
  pub username: String,
  pub password_hash: String,
  pub balance: i64,
  pub role: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
  type Error = StoreError;

  fn try_from(row: UserRow) -> Result<Self, Self::Error> {
    let role = row
      .role
      .parse::<Role>()
      .map_err(|e| StoreError::backend(anyhow::anyhow!("user {}: {}", row.id, e)))?;
    Ok(User {
      id: row.id,
      username: row.username,
      password_hash: row.password_hash,
      balance: row.balance,
      role,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}
