use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Rejected input, such as enabling auth without credentials
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Password hashing failed: {0}")]
    HashingError(String),
}

impl AuthError {
    /// Stable machine-readable code, used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::HashingError(_) => "INTERNAL_ERROR",
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
