// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Secret used when no database is configured and `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "coinslot-dev-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "pretty" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected 'pretty' or 'json'", other))),
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` selects the in-memory store.
  pub database_url: Option<String>,
  pub db_max_connections: u32,
  pub run_migrations: bool,

  pub jwt_secret: String,
  pub jwt_ttl_seconds: i64,

  // Creates demo accounts and products on startup
  pub seed_db: bool,
  pub log_format: LogFormat,
}

// Keeps the secret and the connection string out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("db_max_connections", &self.db_max_connections)
      .field("run_migrations", &self.run_migrations)
      .field("jwt_secret", &"[REDACTED]")
      .field("jwt_ttl_seconds", &self.jwt_ttl_seconds)
      .field("seed_db", &self.seed_db)
      .field("log_format", &self.log_format)
      .finish()
  }
}

fn parse<T>(var_name: &str, raw: String) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_source(|var_name| env::var(var_name).ok())
  }

  /// Builds the configuration from any variable source. `from_env` passes the process environment.
  pub fn from_source<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_env = |var_name: &str| lookup(var_name).filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse::<u16>("SERVER_PORT", get_env("SERVER_PORT").unwrap_or_else(|| "8080".to_string()))?;
    let database_url = get_env("DATABASE_URL");
    let db_max_connections =
      parse::<u32>("DB_MAX_CONNECTIONS", get_env("DB_MAX_CONNECTIONS").unwrap_or_else(|| "5".to_string()))?;
    if db_max_connections == 0 {
      return Err(AppError::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
    }
    let run_migrations =
      parse::<bool>("RUN_MIGRATIONS", get_env("RUN_MIGRATIONS").unwrap_or_else(|| "true".to_string()))?;

    let jwt_secret = match (get_env("JWT_SECRET"), &database_url) {
      (Some(secret), _) => secret,
      (None, None) => DEV_JWT_SECRET.to_string(),
      (None, Some(_)) => {
        return Err(AppError::Config(
          "Missing environment variable 'JWT_SECRET' (required when DATABASE_URL is set)".to_string(),
        ))
      }
    };
    let jwt_ttl_seconds =
      parse::<i64>("JWT_TTL_SECONDS", get_env("JWT_TTL_SECONDS").unwrap_or_else(|| "3600".to_string()))?;
    if jwt_ttl_seconds <= 0 {
      return Err(AppError::Config("JWT_TTL_SECONDS must be positive".to_string()));
    }

    let seed_db = parse::<bool>("SEED_DB", get_env("SEED_DB").unwrap_or_else(|| "false".to_string()))?;
    let log_format = get_env("LOG_FORMAT")
      .map(|v| v.parse::<LogFormat>())
      .transpose()?
      .unwrap_or(LogFormat::Pretty);

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      run_migrations,
      jwt_secret,
      jwt_ttl_seconds,
      seed_db,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_source(|name| map.get(name).cloned())
  }

  #[test]
  fn defaults_select_the_memory_store() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.bind_address(), "127.0.0.1:8080");
    assert!(config.database_url.is_none());
    assert_eq!(config.db_max_connections, 5);
    assert!(config.run_migrations);
    assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
    assert_eq!(config.jwt_ttl_seconds, 3600);
    assert!(!config.seed_db);
    assert_eq!(config.log_format, LogFormat::Pretty);
  }

  #[test]
  fn database_requires_a_jwt_secret() {
    let err = config_from(&[("DATABASE_URL", "postgres://localhost/coinslot")]).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("JWT_SECRET")));

    let config = config_from(&[
      ("DATABASE_URL", "postgres://localhost/coinslot"),
      ("JWT_SECRET", "s3cr3t"),
      ("LOG_FORMAT", "JSON"),
    ])
    .unwrap();
    assert_eq!(config.jwt_secret, "s3cr3t");
    assert_eq!(config.log_format, LogFormat::Json);
  }

  #[test]
  fn invalid_values_are_config_errors() {
    for vars in [
      [("SERVER_PORT", "eighty")],
      [("SEED_DB", "yes")],
      [("JWT_TTL_SECONDS", "0")],
      [("LOG_FORMAT", "xml")],
      [("DB_MAX_CONNECTIONS", "0")],
    ] {
      assert!(matches!(config_from(&vars), Err(AppError::Config(_))), "accepted {:?}", vars);
    }
  }

  #[test]
  fn debug_output_redacts_secrets() {
    let config = config_from(&[
      ("DATABASE_URL", "postgres://user:pw@localhost/coinslot"),
      ("JWT_SECRET", "s3cr3t"),
    ])
    .unwrap();
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("s3cr3t"));
    assert!(!rendered.contains("pw@"));
  }
}
