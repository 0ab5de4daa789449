// Password hashing and validation module

use crate::error::{AuthError, AuthResult};
use bcrypt::{hash, verify};

/// Maximum password length (bcrypt has a 72-byte limit)
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Hash a password using bcrypt.
///
/// Runs on a blocking thread pool to avoid blocking the async runtime.
pub async fn hash_password(password: &str, cost: u32) -> AuthResult<String> {
    validate_password(password)?;
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| AuthError::HashingError(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::HashingError(format!("Task join error: {}", e)))?
}

/// Verify a password against a bcrypt hash.
///
/// Returns `Ok(false)` on mismatch, `Err` only when the hash itself is unusable.
pub async fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || {
        verify(password, &hash).map_err(|e| AuthError::HashingError(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::HashingError(format!("Task join error: {}", e)))?
}

/// Reject empty passwords and ones bcrypt would silently truncate.
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hashed = hash_password("s3cret", TEST_COST).await.unwrap();
        assert_ne!(hashed, "s3cret");
        assert!(verify_password("s3cret", &hashed).await.unwrap());
        assert!(!verify_password("wrong", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized() {
        assert!(matches!(
            hash_password("", TEST_COST).await,
            Err(AuthError::Validation(_))
        ));
        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(hash_password(&long, TEST_COST).await.is_err());
    }

    #[tokio::test]
    async fn test_verify_against_garbage_hash_is_error() {
        assert!(verify_password("a", "not-a-bcrypt-hash").await.is_err());
    }
}
