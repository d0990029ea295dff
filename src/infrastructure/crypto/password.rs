//! Password hashing utilities
//!
//! Each password gets its own random 16-byte salt, kept hex encoded next to
//! the bcrypt hash.

use bcrypt::{hash_with_salt, verify, Version};

use crate::domain::PasswordHash;
use crate::shared::{AuthError, AuthResult, InfraError};

pub use bcrypt::DEFAULT_COST;

/// Fresh random salt
pub fn generate_salt() -> [u8; 16] {
    rand::random()
}

/// Hash a password with a freshly generated salt
pub fn hash_password(password: &str, cost: u32) -> Result<PasswordHash, InfraError> {
    let salt = generate_salt();
    let parts = hash_with_salt(password, cost, salt)?;
    Ok(PasswordHash {
        hash: parts.format_for_version(Version::TwoB),
        salt: hex::encode(salt),
    })
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, InfraError> {
    Ok(verify(password, hash)?)
}

/// `hash_password` on the blocking pool, off the async workers.
pub async fn hash_password_blocking(password: String, cost: u32) -> AuthResult<PasswordHash> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(AuthError::from)
}

/// `verify_password` on the blocking pool. A malformed stored hash counts
/// as a mismatch.
pub async fn verify_password_blocking(password: String, hash: String) -> AuthResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash).unwrap_or(false))
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))
}
