//! Client-side session manager for the identity service.
//!
//! Holds the current access token and public account fields, attaches the
//! token to every request, and on a 401 transparently refreshes the token
//! once and retries. Concurrent 401s coalesce into a single in-flight
//! refresh; everyone else waits for its outcome.
//!
//! The refresh token itself never passes through this code: it lives in an
//! http-only cookie managed by the underlying HTTP client's cookie jar.

use reqwest::Method;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The session could not be silently renewed; the caller should send the
    /// user back through login.
    #[error("Session expired")]
    SessionExpired,

    /// The server rejected the request; `message` is its response body text.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Public account fields as returned by the server. Nothing secret and
/// nothing role-altering is ever held client-side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub name: String,
    pub verified: bool,
}

/// Registration payload; role-specific fields stay `None`/empty outside
/// their role.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expertise: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterOutcome {
    pub user: SessionUser,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    access_token: String,
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    user: SessionUser,
}

pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    access_token: RwLock<Option<String>>,
    user: RwLock<Option<SessionUser>>,
    // Serializes refresh attempts; waiters re-check the token under the
    // lock so only the first of a stampede actually calls the server.
    refresh_lock: Mutex<()>,
}

impl SessionClient {
    /// # Panics
    /// Panics if the underlying HTTP client cannot be constructed, which
    /// only happens on a broken TLS backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("failed to build http client");

        Self {
            http,
            base_url: base_url.into(),
            access_token: RwLock::new(None),
            user: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// The cached public account, if a session is live.
    pub async fn current_user(&self) -> Option<SessionUser> {
        self.user.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    pub async fn register(&self, registration: &Registration) -> Result<RegisterOutcome, ClientError> {
        let body = serde_json::to_value(registration)
            .expect("registration payload serializes");
        let response = self
            .send(Method::POST, "/api/auth/register", Some(body))
            .await?;
        Ok(Self::parse(response).await?)
    }

    /// Log in and store the returned token and account.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let response = self
            .send(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        let body: LoginBody = Self::parse(response).await?;

        *self.access_token.write().await = Some(body.access_token);
        *self.user.write().await = Some(body.user.clone());

        Ok(body.user)
    }

    /// Revoke the server-side session and drop local state. Local state is
    /// cleared even if the server call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.send(Method::POST, "/api/auth/logout", None).await;

        *self.access_token.write().await = None;
        *self.user.write().await = None;

        let response = result?;
        let _: MessageBody = Self::parse(response).await?;
        Ok(())
    }

    /// Fetch the current account from the server and refresh the cache.
    pub async fn me(&self) -> Result<SessionUser, ClientError> {
        let response = self.send(Method::GET, "/api/auth/me", None).await?;
        let body: UserBody = Self::parse(response).await?;

        *self.user.write().await = Some(body.user.clone());
        Ok(body.user)
    }

    pub async fn verify_email(&self, token: &str) -> Result<String, ClientError> {
        let response = self
            .send(
                Method::POST,
                "/api/auth/verify-email",
                Some(json!({ "token": token })),
            )
            .await?;
        let body: MessageBody = Self::parse(response).await?;
        Ok(body.message)
    }

    pub async fn resend_verification(&self, email: &str) -> Result<String, ClientError> {
        let response = self
            .send(
                Method::POST,
                "/api/auth/resend-verification",
                Some(json!({ "email": email })),
            )
            .await?;
        let body: MessageBody = Self::parse(response).await?;
        Ok(body.message)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String, ClientError> {
        let response = self
            .send(
                Method::POST,
                "/api/auth/forgot-password",
                Some(json!({ "email": email })),
            )
            .await?;
        let body: MessageBody = Self::parse(response).await?;
        Ok(body.message)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .send(
                Method::POST,
                "/api/auth/reset-password",
                Some(json!({ "token": token, "newPassword": new_password })),
            )
            .await?;
        let body: MessageBody = Self::parse(response).await?;
        Ok(body.message)
    }

    /// Issue one request; on a 401 from any endpoint except login and
    /// refresh, silently refresh the access token and retry exactly once.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self.dispatch(method.clone(), path, body.as_ref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || Self::is_refresh_exempt(path) {
            return Ok(response);
        }

        // Remember which token earned the 401: if it changed by the time we
        // hold the refresh lock, someone else already refreshed for us.
        let observed = self.access_token.read().await.clone();
        self.refresh_access_token(observed).await?;

        tracing::debug!(path, "Retrying request with refreshed access token");
        Ok(self.dispatch(method, path, body.as_ref()).await?)
    }

    fn is_refresh_exempt(path: &str) -> bool {
        path == "/api/auth/login" || path == "/api/auth/refresh-token"
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));

        if let Some(token) = self.access_token.read().await.as_deref() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await
    }

    async fn refresh_access_token(&self, observed: Option<String>) -> Result<(), ClientError> {
        let _guard = self.refresh_lock.lock().await;

        // Single-flight: a refresh that completed while we queued already
        // replaced the token we saw fail.
        if *self.access_token.read().await != observed {
            return Ok(());
        }

        let response = self
            .http
            .post(format!("{}/api/auth/refresh-token", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(status = response.status().as_u16(), "Silent refresh failed");
            *self.access_token.write().await = None;
            *self.user.write().await = None;
            return Err(ClientError::SessionExpired);
        }

        let body: RefreshBody = response.json().await?;
        *self.access_token.write().await = Some(body.access_token);

        Ok(())
    }

    /// Deserialize a success body, or turn an error status into
    /// [`ClientError::Api`] carrying the server's message.
    async fn parse<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<MessageBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
