use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::account::models::Account;
use crate::domain::account::models::PublicAccount;
use crate::domain::auth::errors::AuthError;

pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh_token;
pub mod register;
pub mod resend_verification;
pub mod reset_password;
pub mod verify_email;

/// Error half of every handler's return type.
///
/// Serializes as a flat `{"message": "..."}` body; status comes from the
/// variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    TooManyRequests(String),
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(MessageBody { message })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(_)
            | AuthError::DuplicateEmail
            | AuthError::InvalidOrExpiredToken => ApiError::BadRequest(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::EmailNotVerified
            | AuthError::NoRefreshToken
            | AuthError::Unauthorized => ApiError::Unauthorized(err.to_string()),
            AuthError::AccountSuspended
            | AuthError::InvalidRefreshToken
            | AuthError::Forbidden => ApiError::Forbidden(err.to_string()),
            AuthError::RateLimited => ApiError::TooManyRequests(err.to_string()),
            AuthError::Internal(detail) => {
                // The detail stays in the logs; clients get a generic line.
                tracing::error!(error = %detail, "Request failed with internal error");
                ApiError::InternalServerError("Server error".to_string())
            }
        }
    }
}

/// Flat `{"message": ...}` body, used for errors and message-only successes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Account shape shared by register, login, and me responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: String,
    pub email: String,
    pub role: String,
    pub name: String,
    pub verified: bool,
}

impl From<&Account> for AccountData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.as_str().to_string(),
            role: account.role.as_str().to_string(),
            name: account.name.clone(),
            verified: account.verified,
        }
    }
}

impl From<&PublicAccount> for AccountData {
    fn from(account: &PublicAccount) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.clone(),
            role: account.role.as_str().to_string(),
            name: account.name.clone(),
            verified: account.verified,
        }
    }
}
