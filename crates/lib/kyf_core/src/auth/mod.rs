//! Authentication: password hashing, session tokens, e-mail confirmation
//! tokens and the credential store queries.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod tokens;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Account is deactivated")]
    InactiveAccount,

    #[error("E-mail not confirmed")]
    EmailNotConfirmed,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
