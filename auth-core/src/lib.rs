//! Core authentication primitives
//!
//! Pure building blocks shared by the identity service:
//! - Password hashing (Argon2id)
//! - Signed, time-bound access and refresh tokens (JWT)
//! - Opaque single-purpose tokens and their one-way hashes
//!
//! Nothing in this crate performs I/O. Persistence and transport decisions
//! belong to the services consuming these types.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth_core::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Access/Refresh Tokens
//! ```
//! use auth_core::TokenCodec;
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(
//!     b"access_secret_at_least_32_bytes_long!",
//!     b"refresh_secret_at_least_32_bytes_lng!",
//!     Duration::minutes(15),
//!     Duration::days(7),
//! );
//! let token = codec.issue_access_token("account-id").unwrap();
//! let claims = codec.verify_access_token(&token).unwrap();
//! assert_eq!(claims.sub, "account-id");
//! ```
//!
//! ## Opaque Tokens
//! ```
//! use auth_core::opaque::{hash_token, OpaqueToken};
//!
//! let token = OpaqueToken::generate();
//! // Persist only the hash; mail the plaintext to the user.
//! assert_eq!(hash_token(token.plaintext()), token.hash());
//! ```

pub mod codec;
pub mod opaque;
pub mod password;

pub use codec::Claims;
pub use codec::TokenCodec;
pub use codec::TokenError;
pub use opaque::OpaqueToken;
pub use password::PasswordError;
pub use password::PasswordHasher;
