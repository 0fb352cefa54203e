// server/src/state.rs
use crate::config::AppConfig;
use crate::services::token_service::TokenService;
use coinslot::Store;
use std::sync::Arc;

/// Handles shared by every worker. Cloned per worker by `HttpServer`.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub tokens: Arc<TokenService>,
}

impl AppState {
  pub fn new(store: Arc<dyn Store>, config: &AppConfig) -> Self {
    let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes(), config.jwt_ttl_seconds));
    Self { store, tokens }
  }
}
