//! Opaque single-purpose tokens (email verification, password reset,
//! refresh-session tracking).
//!
//! A token is 256 bits from the OS RNG, hex-encoded. Only the SHA-256 digest
//! of the plaintext is ever persisted; lookups hash the presented value with
//! [`hash_token`] and compare digests.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Digest;
use sha2::Sha256;

/// A freshly minted opaque token: the plaintext handed to the user and the
/// digest handed to storage.
///
/// Constructing one through [`OpaqueToken::generate`] is the only way tokens
/// are minted, so the plaintext never reaches a persistence layer by accident.
#[derive(Debug, Clone)]
pub struct OpaqueToken {
    plaintext: String,
    hash: String,
}

impl OpaqueToken {
    /// Generate a new token from 32 random bytes.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);

        let plaintext = hex::encode(bytes);
        let hash = hash_token(&plaintext);
        Self { plaintext, hash }
    }

    /// The value sent to the user (mail link, cookie). Never stored.
    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    /// The value stored and compared server-side.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// One-way hash applied to every opaque token before storage or lookup.
pub fn hash_token(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}
