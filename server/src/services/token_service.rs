// server/src/services/token_service.rs

//! HS256 bearer tokens identifying a user.

use crate::errors::AppError;
use chrono::{Duration, Utc};
use coinslot::User;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String, // User id
  pub username: String,
  pub iat: i64,
  pub exp: i64,
}

impl Claims {
  pub fn user_id(&self) -> Result<Uuid, AppError> {
    Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth("Invalid token subject.".to_string()))
  }
}

pub struct TokenService {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  validation: Validation,
  ttl: Duration,
}

impl TokenService {
  pub fn new(secret: &[u8], ttl_seconds: i64) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    Self {
      encoding_key: EncodingKey::from_secret(secret),
      decoding_key: DecodingKey::from_secret(secret),
      validation,
      ttl: Duration::seconds(ttl_seconds),
    }
  }

  #[instrument(name = "token_service::issue", skip(self, user), fields(user_id = %user.id), err(Display))]
  pub fn issue(&self, user: &User) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
      sub: user.id.to_string(),
      username: user.username.clone(),
      iat: now.timestamp(),
      exp: (now + self.ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
  }

  /// Checks signature and expiry. Every failure is an authentication error.
  pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &self.decoding_key, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| {
        debug!(error = %e, "Bearer token rejected.");
        match e.kind() {
          ErrorKind::ExpiredSignature => AppError::Auth("Token expired.".to_string()),
          _ => AppError::Auth("Invalid token.".to_string()),
        }
      })
  }
}
