// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer}; // Renamed web to actix_data
use coinslot::{MemoryStore, Store};
use coinslot_server::config::LogFormat;
use coinslot_server::db::{self, PgStore};
use coinslot_server::services::seed;
use coinslot_server::{configure_app, AppConfig, AppError, AppState};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  // RUST_LOG overrides the default level
  let builder = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

fn startup_error(e: AppError) -> std::io::Error {
  tracing::error!(error = %e, "Startup failed.");
  std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Logging is configured from the same source, so errors here can only be returned.
  let app_config = Arc::new(AppConfig::from_env().map_err(|e| std::io::Error::other(e.to_string()))?);
  init_tracing(app_config.log_format);
  tracing::info!(config = ?app_config, "Starting coinslot server...");

  let store: Arc<dyn Store> = match app_config.database_url.as_deref() {
    Some(database_url) => {
      let pool = db::connect(&app_config, database_url).await.map_err(startup_error)?;
      if app_config.run_migrations {
        db::run_migrations(&pool).await.map_err(startup_error)?;
      }
      Arc::new(PgStore::new(pool))
    }
    None => {
      tracing::warn!("DATABASE_URL is not set; using the in-memory store. Data is lost on shutdown.");
      Arc::new(MemoryStore::new())
    }
  };

  if app_config.seed_db {
    seed::seed_demo_data(store.as_ref()).await.map_err(startup_error)?;
  }

  let app_state = AppState::new(store, &app_config);

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app)
  })
  .bind(&server_address)?
  .run()
  .await
}
