// server/src/lib.rs

//! HTTP front end of the coinslot vending machine: actix-web handlers, bearer
//! authentication, configuration and the Postgres store.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
pub use crate::web::configure_app;
