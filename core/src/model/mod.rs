// core/src/model/mod.rs

//! Records persisted by the stores and the change-sets applied to them.

pub mod product;
pub mod user;

pub use product::{NewProduct, Product, ProductChanges, ProductFilter};
pub use user::{NewUser, Role, User, UserChanges};
