use std::sync::Arc;

use async_trait::async_trait;
use auth_core::opaque::OpaqueToken;
use auth_core::PasswordHasher;
use auth_core::TokenCodec;
use chrono::Duration;
use chrono::Utc;

use crate::domain::account::models::AccountId;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::PublicAccount;
use crate::domain::account::models::Role;
use crate::domain::account::ports::AccountRepository;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::RegisterOutcome;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::Mailer;
use crate::domain::auth::ports::RateLimitDecision;
use crate::domain::auth::ports::RateLimiter;
use crate::domain::ledger::models::HashedToken;
use crate::domain::ledger::models::TokenPurpose;
use crate::domain::ledger::ports::LedgerError;
use crate::domain::ledger::ports::TokenLedger;

const VERIFICATION_TTL_HOURS: i64 = 24;
const RESET_TTL_HOURS: i64 = 1;

/// Auth lifecycle service.
///
/// Orchestrates the credential store, the token ledger, the token codec, and
/// the mail/rate-limit collaborators. All dependencies are injected so the
/// service is testable with fakes.
pub struct AuthService<AR, TL>
where
    AR: AccountRepository,
    TL: TokenLedger,
{
    accounts: Arc<AR>,
    ledger: Arc<TL>,
    mailer: Arc<dyn Mailer>,
    rate_limiter: Arc<dyn RateLimiter>,
    codec: Arc<TokenCodec>,
    password_hasher: PasswordHasher,
    client_url: String,
    refresh_ttl: Duration,
}

impl<AR, TL> AuthService<AR, TL>
where
    AR: AccountRepository,
    TL: TokenLedger,
{
    /// Create the service with injected collaborators.
    ///
    /// `client_url` is the frontend base used to build email links;
    /// `refresh_ttl` must match the codec's refresh token lifetime so the
    /// ledger row and the signature expire together.
    pub fn new(
        accounts: Arc<AR>,
        ledger: Arc<TL>,
        mailer: Arc<dyn Mailer>,
        rate_limiter: Arc<dyn RateLimiter>,
        codec: Arc<TokenCodec>,
        client_url: String,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            accounts,
            ledger,
            mailer,
            rate_limiter,
            codec,
            password_hasher: PasswordHasher::new(),
            client_url,
            refresh_ttl,
        }
    }

    fn validate_profile(command: &RegisterCommand) -> Result<(), AuthError> {
        match command.role {
            Role::Startup
                if command
                    .profile
                    .company_name
                    .as_deref()
                    .map_or(true, |name| name.trim().is_empty()) =>
            {
                Err(AuthError::Validation(
                    "Company name is required for startups".to_string(),
                ))
            }
            Role::Expert if command.profile.expertise.is_empty() => Err(AuthError::Validation(
                "Expertise is required for experts".to_string(),
            )),
            _ => Ok(()),
        }
    }

    async fn send_verification_email(&self, to: &str, token: &str) -> bool {
        let link = format!("{}/verify-email?token={}", self.client_url, token);
        let html = format!(
            "<p>Click below to verify your email:</p>\n<a href=\"{link}\">{link}</a>"
        );
        match self.mailer.send(to, "Verify your email", &html).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send verification email");
                false
            }
        }
    }

    /// The fallible part of forgot-password; the public method swallows
    /// everything this returns so responses stay uniform.
    async fn issue_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = OpaqueToken::generate();
        self.ledger
            .store(
                TokenPurpose::PasswordReset,
                &account.id,
                HashedToken::new(
                    token.hash().to_string(),
                    Utc::now() + Duration::hours(RESET_TTL_HOURS),
                ),
                None,
            )
            .await?;

        let link = format!(
            "{}/reset-password?token={}",
            self.client_url,
            token.plaintext()
        );
        let html = format!(
            "<p>Click below to reset your password:</p>\n<a href=\"{link}\">{link}</a>"
        );
        self.mailer
            .send(account.email.as_str(), "Reset your password", &html)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl<AR, TL> AuthServicePort for AuthService<AR, TL>
where
    AR: AccountRepository,
    TL: TokenLedger,
{
    async fn register(&self, command: RegisterCommand) -> Result<RegisterOutcome, AuthError> {
        Self::validate_profile(&command)?;

        let password_hash = self.password_hasher.hash(&command.password)?;
        let verification = OpaqueToken::generate();

        let new_account = NewAccount {
            id: AccountId::new(),
            email: command.email,
            password_hash,
            role: command.role,
            name: command.name,
            profile: command.profile,
        };

        // Account, profile, and verification token commit together; the email
        // goes out after the transaction so a slow or failing mail provider
        // cannot roll back the account.
        let account = self
            .accounts
            .create(
                new_account,
                HashedToken::new(
                    verification.hash().to_string(),
                    Utc::now() + Duration::hours(VERIFICATION_TTL_HOURS),
                ),
            )
            .await?;

        let verification_email_sent = self
            .send_verification_email(account.email.as_str(), verification.plaintext())
            .await;

        tracing::info!(account_id = %account.id, role = %account.role, "Account registered");

        Ok(RegisterOutcome {
            account,
            verification_email_sent,
        })
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        user_agent: Option<String>,
    ) -> Result<LoginOutcome, AuthError> {
        // Unknown email and wrong password collapse into one answer.
        let Some(account) = self.accounts.find_by_email(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .password_hasher
            .verify(password, &account.password_hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        if !account.verified {
            return Err(AuthError::EmailNotVerified);
        }
        if account.suspended {
            return Err(AuthError::AccountSuspended);
        }

        let subject = account.id.to_string();
        let access_token = self
            .codec
            .issue_access_token(&subject)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let refresh_token = self
            .codec
            .issue_refresh_token(&subject)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.ledger
            .store(
                TokenPurpose::RefreshSession,
                &account.id,
                HashedToken::new(
                    auth_core::opaque::hash_token(&refresh_token),
                    Utc::now() + self.refresh_ttl,
                ),
                user_agent,
            )
            .await?;

        tracing::info!(account_id = %account.id, "Login succeeded");

        Ok(LoginOutcome {
            access_token,
            refresh_token,
            account,
        })
    }

    async fn verify_email(&self, token: &str) -> Result<(), AuthError> {
        let account_id = self
            .ledger
            .consume(TokenPurpose::EmailVerification, token)
            .await?;

        self.accounts.set_verified(&account_id).await?;
        tracing::info!(account_id = %account_id, "Email verified");
        Ok(())
    }

    async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let Some(account) = self.accounts.find_by_email(email).await? else {
            tracing::debug!("Verification resend requested for unknown email");
            return Ok(());
        };
        if account.verified {
            return Ok(());
        }

        // Storing a verification token supersedes every prior one.
        let token = OpaqueToken::generate();
        self.ledger
            .store(
                TokenPurpose::EmailVerification,
                &account.id,
                HashedToken::new(
                    token.hash().to_string(),
                    Utc::now() + Duration::hours(VERIFICATION_TTL_HOURS),
                ),
                None,
            )
            .await?;

        self.send_verification_email(account.email.as_str(), token.plaintext())
            .await;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let key = format!("forgot:{email}");
        if self.rate_limiter.check(&key) == RateLimitDecision::Limited {
            return Err(AuthError::RateLimited);
        }

        // Whatever happens past the rate limit, the caller gets the same
        // generic success; failures are only logged.
        if let Err(e) = self.issue_password_reset(email).await {
            tracing::error!(error = %e, "Forgot-password processing failed");
        }
        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let account_id = self
            .ledger
            .consume(TokenPurpose::PasswordReset, token)
            .await?;

        let hash = self.password_hasher.hash(new_password)?;
        self.accounts.set_password_hash(&account_id, &hash).await?;

        // The matched row is already gone; clear any transient siblings too.
        self.ledger
            .revoke_for_account(TokenPurpose::PasswordReset, &account_id)
            .await?;

        tracing::info!(account_id = %account_id, "Password reset");
        Ok(())
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AuthError> {
        let Some(token) = refresh_token else {
            return Err(AuthError::NoRefreshToken);
        };

        // Not-found, expired, and bad-signature all collapse into one
        // response so nothing leaks about which check failed.
        let account_id = self
            .ledger
            .consume(TokenPurpose::RefreshSession, token)
            .await
            .map_err(|e| match e {
                LedgerError::TokenNotFound => AuthError::InvalidRefreshToken,
                LedgerError::Database(msg) => AuthError::Internal(msg),
            })?;

        let claims = self
            .codec
            .verify_refresh_token(token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        if claims.sub != account_id.to_string() {
            return Err(AuthError::InvalidRefreshToken);
        }

        self.codec
            .issue_access_token(&claims.sub)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError> {
        if let Some(token) = refresh_token {
            self.ledger
                .revoke_by_token(TokenPurpose::RefreshSession, token)
                .await?;
        }
        Ok(())
    }

    async fn current_account(&self, access_token: &str) -> Result<PublicAccount, AuthError> {
        let claims = self
            .codec
            .verify_access_token(access_token)
            .map_err(|_| AuthError::Unauthorized)?;

        let account_id =
            AccountId::from_string(&claims.sub).map_err(|_| AuthError::Unauthorized)?;

        let Some(account) = self.accounts.find_by_id(&account_id).await? else {
            return Err(AuthError::Unauthorized);
        };

        // Suspension can happen after a token was issued, so both gates run
        // on every authenticated request.
        if !account.verified {
            return Err(AuthError::EmailNotVerified);
        }
        if account.suspended {
            return Err(AuthError::AccountSuspended);
        }

        Ok(PublicAccount::from(&account))
    }
}
