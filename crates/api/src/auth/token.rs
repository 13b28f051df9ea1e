//! Argon2id hashing and verification of the shared bearer token.
//!
//! Only the PHC-formatted hash is configured (`TOKEN_HASH`); the plaintext
//! token lives in the monitor's notification plugin.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash a plaintext token using Argon2id with a random salt.
pub fn hash_token(token: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(token.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext token against a PHC-formatted hash.
///
/// Returns `Ok(false)` on mismatch and `Err` only if the hash is malformed.
pub fn verify_token(token: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(token.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}
