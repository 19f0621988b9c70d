//! Credential and session-token primitives.
//!
//! Passwords and one-time codes share one hashing primitive; session tokens
//! are HMAC-signed claims verified with a shared secret.

mod error;
mod token;

pub use error::AuthError;
pub use token::SessionTokens;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a secret (password or one-time code) using Argon2id.
///
/// Every call uses a fresh random salt, so hashing the same input twice
/// yields different strings.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_secret(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a secret against a stored hash.
///
/// An unparsable hash never matches.
#[must_use]
pub fn verify_secret(plain: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}
