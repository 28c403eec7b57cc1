use std::fmt;

use chrono::DateTime;
use chrono::Utc;

/// The three purposes the ephemeral token ledger serves.
///
/// Each purpose has its own replacement semantics on store and its own
/// consumption semantics (see [`crate::domain::ledger::ports::TokenLedger`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
    RefreshSession,
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
            TokenPurpose::RefreshSession => "refresh_session",
        };
        f.write_str(name)
    }
}

/// A token as the ledger sees it: one-way hash plus expiry.
///
/// Plaintext never crosses this boundary on the write path.
#[derive(Debug, Clone)]
pub struct HashedToken {
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

impl HashedToken {
    pub fn new(hash: String, expires_at: DateTime<Utc>) -> Self {
        Self { hash, expires_at }
    }
}
