use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Error type for token issuance and verification.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Token is expired")]
    Expired,

    #[error("Token is invalid")]
    Invalid,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Claims carried by both token classes.
///
/// The subject is the account id; nothing else is embedded so a leaked
/// token reveals no account data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account identifier)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

/// Issues and verifies the two token classes used by the auth lifecycle.
///
/// Access tokens are short-lived and sent per-request; refresh tokens are
/// long-lived and live in an http-only cookie. Each class is signed with its
/// own secret so leaking one cannot forge the other. HS256 throughout.
pub struct TokenCodec {
    access: KeyPair,
    refresh: KeyPair,
}

impl TokenCodec {
    /// Create a codec from the two signing secrets and their token lifetimes.
    ///
    /// Secrets should be at least 256 bits and must differ from each other.
    pub fn new(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: KeyPair::new(access_secret, access_ttl),
            refresh: KeyPair::new(refresh_secret, refresh_ttl),
        }
    }

    /// Issue a short-lived access token for the given subject.
    ///
    /// # Errors
    /// * `Signing` - token encoding failed
    pub fn issue_access_token(&self, subject: &str) -> Result<String, TokenError> {
        issue(&self.access, subject)
    }

    /// Issue a long-lived refresh token for the given subject.
    ///
    /// # Errors
    /// * `Signing` - token encoding failed
    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, TokenError> {
        issue(&self.refresh, subject)
    }

    /// Verify an access token and return its claims.
    ///
    /// # Errors
    /// * `Expired` - the `exp` claim has elapsed
    /// * `Invalid` - bad signature or structurally malformed token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        verify(&self.access, token)
    }

    /// Verify a refresh token and return its claims.
    ///
    /// # Errors
    /// * `Expired` - the `exp` claim has elapsed
    /// * `Invalid` - bad signature or structurally malformed token
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        verify(&self.refresh, token)
    }
}

fn issue(keys: &KeyPair, subject: &str) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        sub: subject.to_string(),
        iat: now.timestamp(),
        exp: (now + keys.ttl).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|e| TokenError::Signing(e.to_string()))
}

fn verify(keys: &KeyPair, token: &str) -> Result<Claims, TokenError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &keys.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}
