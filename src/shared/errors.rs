use thiserror::Error;

/// Every failure the authentication engine can report.
///
/// All variants are recoverable. Token failures (`InvalidSignature`,
/// `Expired`, `Revoked`) are collapsed into `Unauthorized` before they leave
/// the service, see [`AuthError::into_boundary`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether the operation may succeed if retried (storage outage).
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Unavailable(_))
    }

    /// Whether this is one of the token validation failures.
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidSignature | AuthError::Expired | AuthError::Revoked
        )
    }

    /// Hide which token check failed from callers outside the engine.
    pub fn into_boundary(self) -> Self {
        if self.is_token_failure() {
            AuthError::Unauthorized
        } else {
            self
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Token encoding error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<bcrypt::BcryptError> for InfraError {
    fn from(e: bcrypt::BcryptError) -> Self {
        InfraError::Crypto(e.to_string())
    }
}

impl From<InfraError> for AuthError {
    fn from(e: InfraError) -> Self {
        match e {
            InfraError::Database(_) => AuthError::Unavailable(e.to_string()),
            InfraError::Crypto(_) | InfraError::Token(_) => AuthError::Internal(e.to_string()),
        }
    }
}

/// Result type for engine operations
pub type AuthResult<T> = Result<T, AuthError>;
