use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::account::models::PublicAccount;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::RegisterOutcome;

/// Port for the auth lifecycle service.
///
/// One method per credential-lifecycle operation; HTTP handlers and the auth
/// middleware talk to this trait only.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account, creating the account, its profile, and its
    /// verification token atomically, then sending the verification email.
    ///
    /// # Errors
    /// * `Validation` - missing or invalid role-specific fields
    /// * `DuplicateEmail` - email already registered
    async fn register(&self, command: RegisterCommand) -> Result<RegisterOutcome, AuthError>;

    /// Authenticate by email and password and open a refresh session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - unknown email or wrong password, one message
    /// * `EmailNotVerified` - credentials valid but email unverified
    /// * `AccountSuspended` - credentials valid but account suspended
    async fn login(
        &self,
        email: &str,
        password: &str,
        user_agent: Option<String>,
    ) -> Result<LoginOutcome, AuthError>;

    /// Consume a verification token and mark the account verified.
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - token unknown, expired, or already used
    async fn verify_email(&self, token: &str) -> Result<(), AuthError>;

    /// Revoke prior verification tokens and send a fresh one.
    ///
    /// Enumeration-safe: succeeds whether or not the email is registered.
    async fn resend_verification(&self, email: &str) -> Result<(), AuthError>;

    /// Upsert a password-reset token and send the reset email.
    ///
    /// Enumeration-safe: succeeds whether or not the email is registered,
    /// and internal failures after the rate-limit check are swallowed.
    ///
    /// # Errors
    /// * `RateLimited` - too many requests for this email
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// Consume a reset token and replace the account's password.
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - token unknown, expired, or already used
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;

    /// Exchange a live refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated.
    ///
    /// # Errors
    /// * `NoRefreshToken` - no cookie was presented
    /// * `InvalidRefreshToken` - not found, expired, or bad signature
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AuthError>;

    /// Revoke the refresh session matching the presented token.
    ///
    /// A missing or unknown token is a no-op success.
    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError>;

    /// Resolve an access token to the current account, re-checking the
    /// verified and suspended gates on every call.
    ///
    /// # Errors
    /// * `Unauthorized` - bad or expired token, or account gone
    /// * `EmailNotVerified` / `AccountSuspended` - gates failed since issuance
    async fn current_account(&self, access_token: &str) -> Result<PublicAccount, AuthError>;
}

/// Error for email delivery.
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Email delivery failed: {0}")]
    Delivery(String),
}

/// Transactional email delivery port.
///
/// Delivery failures are logged by callers and never abort the mutation that
/// triggered the email.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailerError>;
}

#[async_trait]
impl<M: Mailer + ?Sized> Mailer for Arc<M> {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailerError> {
        (**self).send(to, subject, html).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

/// Per-identifier rate limiting port, applied to the forgot-password flow.
pub trait RateLimiter: Send + Sync + 'static {
    fn check(&self, key: &str) -> RateLimitDecision;
}

impl<R: RateLimiter + ?Sized> RateLimiter for Arc<R> {
    fn check(&self, key: &str) -> RateLimitDecision {
        (**self).check(key)
    }
}
