// server/src/models/mod.rs

//! Database rows and their conversion into the domain records.

pub mod product;
pub mod user;

pub use product::{ProductRow, PRODUCT_COLUMNS};
pub use user::{UserRow, USER_COLUMNS};
