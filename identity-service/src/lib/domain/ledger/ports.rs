use async_trait::async_trait;
use thiserror::Error;

use crate::domain::account::models::AccountId;
use crate::domain::ledger::models::HashedToken;
use crate::domain::ledger::models::TokenPurpose;

/// Error for token ledger operations.
///
/// Expired rows are reported as `TokenNotFound`; callers cannot distinguish
/// absent from expired, by contract.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Token not found")]
    TokenNotFound,

    #[error("Database error: {0}")]
    Database(String),
}

/// Persistence port for hashed, purpose-scoped, expiring one-time tokens.
///
/// Only hashes cross this boundary on the write path; `consume` and
/// `revoke_by_token` take the plaintext a client presented and hash it
/// internally before any comparison against storage.
#[async_trait]
pub trait TokenLedger: Send + Sync + 'static {
    /// Store a token hash for an account.
    ///
    /// Replacement semantics per purpose:
    /// * `EmailVerification` - prior rows for the account are deleted first
    /// * `PasswordReset` - upsert keyed by account, at most one row ever
    /// * `RefreshSession` - additive, one row per login/device
    ///
    /// `user_agent` is recorded for refresh sessions and ignored otherwise.
    ///
    /// # Errors
    /// * `Database` - storage operation failed
    async fn store(
        &self,
        purpose: TokenPurpose,
        account_id: &AccountId,
        token: HashedToken,
        user_agent: Option<String>,
    ) -> Result<(), LedgerError>;

    /// Resolve a presented plaintext token to the owning account.
    ///
    /// For `EmailVerification` and `PasswordReset` the matched row is deleted
    /// in the same operation, so a replayed token always fails. For
    /// `RefreshSession` the row survives; sessions persist across access-token
    /// renewals until logout or expiry.
    ///
    /// # Errors
    /// * `TokenNotFound` - no live row matches (absent or expired)
    /// * `Database` - storage operation failed
    async fn consume(
        &self,
        purpose: TokenPurpose,
        plaintext: &str,
    ) -> Result<AccountId, LedgerError>;

    /// Delete the row matching a presented plaintext token, if any.
    ///
    /// Used by logout. Missing rows are not an error.
    ///
    /// # Errors
    /// * `Database` - storage operation failed
    async fn revoke_by_token(
        &self,
        purpose: TokenPurpose,
        plaintext: &str,
    ) -> Result<(), LedgerError>;

    /// Delete every row of a purpose held for an account.
    ///
    /// Used before reissuing verification tokens and after a password reset.
    ///
    /// # Errors
    /// * `Database` - storage operation failed
    async fn revoke_for_account(
        &self,
        purpose: TokenPurpose,
        account_id: &AccountId,
    ) -> Result<(), LedgerError>;
}
