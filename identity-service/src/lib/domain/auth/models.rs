use crate::domain::account::models::Account;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Profile;
use crate::domain::account::models::Role;

/// Command to register a new account with domain types.
///
/// Field presence is checked at the HTTP boundary; role-specific profile
/// requirements are enforced by the auth service.
#[derive(Debug)]
pub struct RegisterCommand {
    pub name: String,
    pub email: EmailAddress,
    pub password: String,
    pub role: Role,
    pub profile: Profile,
}

/// Result of a successful registration.
///
/// `verification_email_sent` is false when the account was committed but the
/// mail provider failed; the caller reports a degraded success instead of
/// rolling anything back.
#[derive(Debug)]
pub struct RegisterOutcome {
    pub account: Account,
    pub verification_email_sent: bool,
}

/// Result of a successful login: the token pair plus the account.
///
/// The refresh token plaintext goes into an http-only cookie and is never
/// returned in a response body.
#[derive(Debug)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub account: Account,
}
