//! Password hashing with Argon2id.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors that can occur during credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Failed to hash a password.
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// The stored hash is not a valid PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Verification failed for a reason other than a wrong password.
    #[error("failed to verify password: {0}")]
    Verify(String),
}

/// Hashes a plaintext password into a PHC-format Argon2id string.
///
/// # Errors
///
/// Returns `CredentialError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Verifies a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` on a wrong password; errors are reserved for
/// malformed hashes and unexpected failures.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(hash).map_err(|_| CredentialError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_hash_rejected() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(CredentialError::InvalidHash)));
    }
}
