use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use auth_core::opaque::hash_token;
use auth_core::TokenCodec;
use axum::Router;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use identity_service::domain::account::errors::AccountError;
use identity_service::domain::account::models::Account;
use identity_service::domain::account::models::AccountId;
use identity_service::domain::account::models::NewAccount;
use identity_service::domain::account::ports::AccountRepository;
use identity_service::domain::auth::ports::AuthServicePort;
use identity_service::domain::auth::ports::Mailer;
use identity_service::domain::auth::ports::MailerError;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::ledger::models::HashedToken;
use identity_service::domain::ledger::models::TokenPurpose;
use identity_service::domain::ledger::ports::LedgerError;
use identity_service::domain::ledger::ports::TokenLedger;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use identity_service::outbound::rate_limit::FixedWindowRateLimiter;
use serde_json::json;
use serde_json::Value;

/// Test application: the real router and service on a real port, backed by
/// in-memory adapters so tests need no database or mail relay.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub mailer: Arc<CapturingMailer>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_inner(5, |_| Router::new()).await
    }

    /// Spawn with a custom forgot-password attempt budget.
    pub async fn spawn_with(max_attempts: u32) -> Self {
        Self::spawn_inner(max_attempts, |_| Router::new()).await
    }

    /// Spawn with extra routes built against the same application state;
    /// used by the role-gate tests to mount a gated route.
    pub async fn spawn_with_extra(extra: impl FnOnce(AppState) -> Router) -> Self {
        Self::spawn_inner(5, extra).await
    }

    async fn spawn_inner(max_attempts: u32, extra: impl FnOnce(AppState) -> Router) -> Self {
        let store = InMemoryStore::default();
        let mailer = Arc::new(CapturingMailer::default());

        let codec = Arc::new(TokenCodec::new(
            b"access-secret-for-tests-32-bytes!!!!",
            b"refresh-secret-for-tests-32-bytes!!!",
            Duration::minutes(15),
            Duration::days(7),
        ));

        let auth_service: Arc<dyn AuthServicePort> = Arc::new(AuthService::new(
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::clone(&mailer) as Arc<dyn Mailer>,
            Arc::new(FixedWindowRateLimiter::new(
                StdDuration::from_secs(900),
                max_attempts,
            )),
            codec,
            "http://localhost:5173".to_string(),
            Duration::days(7),
        ));

        let state = AppState {
            auth_service,
            cookie_secure: false,
            refresh_max_age: Duration::days(7).num_seconds(),
        };

        let app = create_router(state.clone()).merge(extra(state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server crashed");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build api client");

        Self {
            address,
            client,
            mailer,
        }
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(&body)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn register(&self, email: &str, password: &str, role: &str) -> reqwest::Response {
        let mut body = json!({
            "name": "Test User",
            "email": email,
            "password": password,
            "role": role,
        });
        if role == "startup" {
            body["companyName"] = json!("Acme");
        }
        if role == "expert" {
            body["expertise"] = json!(["rust"]);
        }
        self.post("/api/auth/register", body).await
    }

    /// Register and complete email verification via the emailed token.
    pub async fn register_and_verify(&self, email: &str, password: &str, role: &str) {
        let response = self.register(email, password, role).await;
        assert_eq!(response.status(), 201, "registration failed");

        let token = self.mailer.last_token_for(email).expect("no email captured");
        let response = self
            .post("/api/auth/verify-email", json!({ "token": token }))
            .await;
        assert_eq!(response.status(), 200, "verification failed");
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post(
            "/api/auth/login",
            json!({ "email": email, "password": password }),
        )
        .await
    }
}

#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mailer that records messages instead of sending them; tests pull tokens
/// out of the captured links. Can be switched to fail on demand.
#[derive(Default)]
pub struct CapturingMailer {
    emails: Mutex<Vec<CapturedEmail>>,
    fail: AtomicBool,
}

impl CapturingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn last_for(&self, to: &str) -> Option<CapturedEmail> {
        self.emails
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|email| email.to == to)
            .cloned()
    }

    /// The token embedded in the most recent email sent to `to`.
    pub fn last_token_for(&self, to: &str) -> Option<String> {
        self.last_for(to).map(|email| token_in(&email.html))
    }

    pub fn sent_count(&self) -> usize {
        self.emails.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailerError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailerError::Delivery("captured failure".to_string()));
        }
        self.emails.lock().unwrap().push(CapturedEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

/// Pull the hex token out of a `?token=` link.
pub fn token_in(html: &str) -> String {
    html.split("token=")
        .nth(1)
        .expect("no token link in email")
        .chars()
        .take_while(char::is_ascii_hexdigit)
        .collect()
}

#[derive(Debug, Clone)]
struct TokenRow {
    account_id: AccountId,
    hash: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct StoreInner {
    accounts: Vec<Account>,
    verifications: Vec<TokenRow>,
    resets: Vec<TokenRow>,
    sessions: Vec<TokenRow>,
}

impl StoreInner {
    fn rows_mut(&mut self, purpose: TokenPurpose) -> &mut Vec<TokenRow> {
        match purpose {
            TokenPurpose::EmailVerification => &mut self.verifications,
            TokenPurpose::PasswordReset => &mut self.resets,
            TokenPurpose::RefreshSession => &mut self.sessions,
        }
    }
}

/// Account store and token ledger in one mutex, mirroring the transactional
/// behavior of the Postgres adapters.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn create(
        &self,
        account: NewAccount,
        verification: HashedToken,
    ) -> Result<Account, AccountError> {
        let mut inner = self.inner.lock().unwrap();

        if inner
            .accounts
            .iter()
            .any(|existing| existing.email == account.email)
        {
            return Err(AccountError::DuplicateEmail(
                account.email.as_str().to_string(),
            ));
        }

        let created = Account {
            id: account.id,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            name: account.name,
            verified: false,
            suspended: false,
            created_at: Utc::now(),
        };
        inner.accounts.push(created.clone());
        inner.verifications.push(TokenRow {
            account_id: created.id,
            hash: verification.hash,
            expires_at: verification.expires_at,
        });

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .accounts
            .iter()
            .find(|account| account.email.as_str() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .accounts
            .iter()
            .find(|account| account.id == *id)
            .cloned())
    }

    async fn set_verified(&self, id: &AccountId) -> Result<(), AccountError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(account) = inner.accounts.iter_mut().find(|account| account.id == *id) {
            account.verified = true;
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), AccountError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(account) = inner.accounts.iter_mut().find(|account| account.id == *id) {
            account.password_hash = hash.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl TokenLedger for InMemoryStore {
    async fn store(
        &self,
        purpose: TokenPurpose,
        account_id: &AccountId,
        token: HashedToken,
        _user_agent: Option<String>,
    ) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        let account_id = *account_id;

        let rows = inner.rows_mut(purpose);
        if purpose != TokenPurpose::RefreshSession {
            rows.retain(|row| row.account_id != account_id);
        }
        rows.push(TokenRow {
            account_id,
            hash: token.hash,
            expires_at: token.expires_at,
        });

        Ok(())
    }

    async fn consume(
        &self,
        purpose: TokenPurpose,
        plaintext: &str,
    ) -> Result<AccountId, LedgerError> {
        let hash = hash_token(plaintext);
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap();

        let rows = inner.rows_mut(purpose);
        let index = rows
            .iter()
            .position(|row| row.hash == hash && row.expires_at > now)
            .ok_or(LedgerError::TokenNotFound)?;

        let account_id = rows[index].account_id;
        if purpose != TokenPurpose::RefreshSession {
            rows.remove(index);
        }

        Ok(account_id)
    }

    async fn revoke_by_token(
        &self,
        purpose: TokenPurpose,
        plaintext: &str,
    ) -> Result<(), LedgerError> {
        let hash = hash_token(plaintext);
        let mut inner = self.inner.lock().unwrap();
        inner.rows_mut(purpose).retain(|row| row.hash != hash);
        Ok(())
    }

    async fn revoke_for_account(
        &self,
        purpose: TokenPurpose,
        account_id: &AccountId,
    ) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        let account_id = *account_id;
        inner
            .rows_mut(purpose)
            .retain(|row| row.account_id != account_id);
        Ok(())
    }
}
