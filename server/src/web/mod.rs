// server/src/web/mod.rs

pub mod dtos;
pub mod extractors;
pub mod handlers;
pub mod routes;

use actix_web::web;

use crate::errors::AppError;

pub use routes::configure_app_routes;

/// Body, path and query extractor settings plus all routes. Malformed input of any
/// kind is answered with the same `VALIDATION_ERROR` body as a failed `Validate`.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|err, _req| AppError::validation(err.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::validation(err.to_string()).into()))
    .configure(configure_app_routes);
}
