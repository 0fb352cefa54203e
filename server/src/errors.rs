// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use coinslot::VendingError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
  pub field: String,
  pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Vending(#[from] VendingError),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Validation Error: {message}")]
  Validation { message: String, details: Vec<FieldIssue> },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String), // For miscellaneous errors
}

impl AppError {
  pub fn validation(message: impl Into<String>) -> Self {
    AppError::Validation {
      message: message.into(),
      details: Vec::new(),
    }
  }

  /// Stable identifier placed in the `error` field of the response body.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Vending(e) => e.code(),
      AppError::Auth(_) => "UNAUTHORIZED",
      AppError::Validation { .. } => "VALIDATION_ERROR",
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
    }
  }
}

fn vending_status(err: &VendingError) -> StatusCode {
  match err {
    VendingError::ProductNotFound | VendingError::UserNotFound => StatusCode::NOT_FOUND,
    VendingError::Forbidden => StatusCode::FORBIDDEN,
    VendingError::UsernameTaken(_) => StatusCode::CONFLICT,
    VendingError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    VendingError::InsufficientStock { .. }
    | VendingError::InsufficientFunds { .. }
    | VendingError::RoleNotPermitted { .. }
    | VendingError::NotProductOwner
    | VendingError::InvalidDepositAmount(_)
    | VendingError::InvalidQuantity(_)
    | VendingError::Validation(_) => StatusCode::BAD_REQUEST,
  }
}

impl From<ValidationErrors> for AppError {
  fn from(errors: ValidationErrors) -> Self {
    let mut details: Vec<FieldIssue> = errors
      .field_errors()
      .into_iter()
      .flat_map(|(field, issues)| {
        issues.iter().map(move |issue| FieldIssue {
          field: field.to_string(),
          message: issue
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{} is invalid ({})", field, issue.code)),
        })
      })
      .collect();
    // field_errors() is backed by a map; keep the output deterministic.
    details.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    let message = details
      .iter()
      .map(|d| d.message.as_str())
      .collect::<Vec<_>>()
      .join(", ");
    AppError::Validation { message, details }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Vending(e) => vending_status(e),
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Validation { .. } => StatusCode::BAD_REQUEST,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      // Log the full error; the client only gets a generic message.
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, code = self.code(), "Request rejected");
    }

    let body = match self {
      AppError::Validation { message, details } => json!({
        "error": self.code(),
        "message": message,
        "details": details,
      }),
      _ if status.is_server_error() => json!({
        "error": self.code(),
        "message": "An internal error occurred",
      }),
      AppError::Vending(e) => json!({"error": self.code(), "message": e.to_string()}),
      AppError::Auth(m) => json!({"error": self.code(), "message": m}),
      _ => json!({"error": self.code(), "message": self.to_string()}),
    };
    HttpResponse::build(status).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
