//! One-time e-mail confirmation tokens.
//!
//! The plaintext goes out in the confirmation link; only its SHA-256 digest
//! is stored, so the `users` table alone cannot be used to confirm accounts.

use rand::{Rng, rng};
use sha2::{Digest, Sha256};

/// Number of random bytes in a confirmation token.
const TOKEN_BYTES: usize = 32;

/// Generate a random confirmation token (64 lowercase hex chars).
pub fn generate_email_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rng().random();
    hex::encode(bytes)
}

/// SHA-256 hash a confirmation token for storage and lookup.
pub fn hash_email_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
