use async_trait::async_trait;

use crate::domain::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::NewAccount;
use crate::domain::ledger::models::HashedToken;

/// Persistence port for the credential store.
///
/// Restricted to the fields and mutations the auth lifecycle needs. The
/// `suspended` flag is read here but only ever set by external admin
/// tooling.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account, its profile, and its initial email-verification
    /// token in one transaction.
    ///
    /// Duplicate emails must be rejected by a unique constraint on the insert
    /// itself, never by a prior existence check.
    ///
    /// # Errors
    /// * `DuplicateEmail` - email is already registered
    /// * `Database` - storage operation failed
    async fn create(
        &self,
        account: NewAccount,
        verification: HashedToken,
    ) -> Result<Account, AccountError>;

    /// Retrieve an account by email address.
    ///
    /// # Errors
    /// * `Database` - storage operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;

    /// Retrieve an account by identifier.
    ///
    /// # Errors
    /// * `Database` - storage operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Mark the account's email as verified. Idempotent.
    ///
    /// # Errors
    /// * `NotFound` - account does not exist
    /// * `Database` - storage operation failed
    async fn set_verified(&self, id: &AccountId) -> Result<(), AccountError>;

    /// Replace the account's password hash. Idempotent.
    ///
    /// # Errors
    /// * `NotFound` - account does not exist
    /// * `Database` - storage operation failed
    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), AccountError>;
}
