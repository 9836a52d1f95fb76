//! Argon2id password hashing, shared by the user repository and the account
//! service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors from hashing or verifying a password.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    /// Argon2 could not hash the password.
    #[error("password hashing failed")]
    Hash,

    /// The password does not match, or the stored hash is unreadable.
    #[error("password does not match")]
    Mismatch,
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Verify a password against a PHC hash string.
///
/// # Errors
///
/// Returns `PasswordError::Mismatch` if the password does not match or the
/// stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::Mismatch)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::Mismatch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Qwerty123$").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Qwerty123$", &hash).is_ok());
        assert_eq!(
            verify_password("qwerty123$", &hash),
            Err(PasswordError::Mismatch)
        );
        assert_eq!(
            verify_password("x", "not-a-hash"),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(
            hash_password("Qwerty123$").unwrap(),
            hash_password("Qwerty123$").unwrap()
        );
    }
}
