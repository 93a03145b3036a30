//! Password hashing with bcrypt.

use bcrypt::{DEFAULT_COST, hash, verify};

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Check a password against a stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to verify password hash");
            false
        }
    }
}

/// Hash a password on the blocking thread pool.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await?
        .map_err(PasswordError::Hash)
}

/// Verify a password on the blocking thread pool.
pub async fn verify_password_blocking(
    password: String,
    password_hash: String,
) -> Result<bool, PasswordError> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&password, &password_hash)).await?)
}

#[derive(Debug)]
pub enum PasswordError {
    Hash(bcrypt::BcryptError),
    /// The blocking task panicked or was cancelled
    Join(tokio::task::JoinError),
}

impl From<tokio::task::JoinError> for PasswordError {
    fn from(e: tokio::task::JoinError) -> Self {
        PasswordError::Join(e)
    }
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::Hash(e) => write!(f, "Failed to hash password: {}", e),
            PasswordError::Join(e) => write!(f, "Password task failed: {}", e),
        }
    }
}

impl std::error::Error for PasswordError {}
