// server/src/services/auth_service.rs

//! Password hashing and verification with Argon2 (default parameters).

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

/// Hashes a plain-text password into a PHC string.
///
/// # Arguments
/// * `password`: The plain-text password. Must not be empty.
///
/// # Returns
/// The Argon2 hash with its embedded salt and parameters, or
/// `AppError::Validation` for an empty password.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::validation("Password cannot be empty."));
  }

  let salt = SaltString::generate(&mut OsRng); // Fresh random salt per hash
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// Checks `candidate` against a hash produced by [`hash_password`].
///
/// # Arguments
/// * `stored_hash`: The PHC string read from the user record.
/// * `candidate`: The password supplied at login.
///
/// # Returns
/// `Ok(false)` on a mismatch or an empty candidate; `Err` only when the stored
/// hash is unusable.
#[instrument(name = "auth_service::verify_password", skip(stored_hash, candidate), err(Display), fields(hash_len = stored_hash.len()))]
pub fn verify_password(stored_hash: &str, candidate: &str) -> Result<bool, AppError> {
  if candidate.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(candidate.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}
