//! Password hashing and verification.
//!
//! Passwords are hashed with Argon2id using default parameters and a random
//! salt from `OsRng`; hashes are stored in PHC string format.
//!
//! The async wrappers run Argon2 on the blocking thread pool.
//!
//! # Example
//!
//! ```
//! use foodsage_auth::password::{hash_password, verify_password};
//!
//! let hash = hash_password("hunter22").unwrap();
//! assert!(verify_password("hunter22", &hash).unwrap());
//! assert!(!verify_password("hunter23", &hash).unwrap());
//! ```

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AuthError;

/// Hash a password for storage.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only if the hash is not a valid
/// PHC string.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if `hash` cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

/// Hashes `password` on the blocking pool.
///
/// # Errors
///
/// Returns `AuthError::Internal` if hashing fails or the task panics.
pub async fn hash_password_async(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))
}

/// Verifies `password` on the blocking pool.
///
/// With `hash = None` the password is checked against a fixed dummy hash and
/// the result is always `false`, so a login for an unknown email costs the
/// same as one with a wrong password.
///
/// # Errors
///
/// Returns `AuthError::Internal` if the stored hash is corrupt or the task panics.
pub async fn verify_password_async(
    password: String,
    hash: Option<String>,
) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            if let Some(dummy) = dummy_hash() {
                let _ = verify_password(&password, dummy);
            }
            Ok(false)
        }
    })
    .await
    .map_err(|e| AuthError::internal(format!("verification task failed: {e}")))?
    .map_err(|e| AuthError::internal(format!("stored password hash is invalid: {e}")))
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("foodsage-dummy-password").ok())
        .as_deref()
}
