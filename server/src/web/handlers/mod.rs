// server/src/web/handlers/mod.rs

// Declare handler modules
pub mod product_handlers;
pub mod user_handlers;
pub mod vending_handlers;
