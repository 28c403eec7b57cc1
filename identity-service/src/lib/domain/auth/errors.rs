use thiserror::Error;

use crate::domain::account::errors::AccountError;
use crate::domain::ledger::ports::LedgerError;

/// Top-level error taxonomy for the auth lifecycle.
///
/// Message text is what clients see; variants that exist to prevent
/// enumeration (`InvalidCredentials`, `InvalidRefreshToken`) deliberately
/// collapse several distinct causes into one message.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please verify your email first")]
    EmailNotVerified,

    #[error("Account is suspended")]
    AccountSuspended,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("No refresh token")]
    NoRefreshToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Too many attempts. Try again later.")]
    RateLimited,

    #[error("Not authorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AccountError> for AuthError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateEmail(_) => AuthError::DuplicateEmail,
            AccountError::InvalidEmail(e) => AuthError::Validation(e.to_string()),
            AccountError::InvalidRole(e) => AuthError::Validation(e.to_string()),
            AccountError::InvalidAccountId(e) => AuthError::Validation(e.to_string()),
            AccountError::NotFound(_) | AccountError::Database(_) => {
                AuthError::Internal(err.to_string())
            }
        }
    }
}

impl From<LedgerError> for AuthError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::TokenNotFound => AuthError::InvalidOrExpiredToken,
            LedgerError::Database(e) => AuthError::Internal(e),
        }
    }
}

impl From<auth_core::PasswordError> for AuthError {
    fn from(err: auth_core::PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<auth_core::TokenError> for AuthError {
    fn from(err: auth_core::TokenError) -> Self {
        match err {
            auth_core::TokenError::Signing(e) => AuthError::Internal(e),
            auth_core::TokenError::Expired | auth_core::TokenError::Invalid => {
                AuthError::Unauthorized
            }
        }
    }
}
