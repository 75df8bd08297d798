//! Account password credentials.
//!
//! New credentials are Argon2id PHC strings
//! (e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`). Registries written by older
//! versions may still hold plaintext passwords; those verify through BLAKE3
//! digests (constant-time equality) and report [`needs_rehash`] so the caller
//! can upgrade them on the next successful login.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{Result, StinkyError};

const MIN_PASSWORD_LENGTH: usize = 4;

/// Validate that a new account password meets minimum requirements.
pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(StinkyError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(StinkyError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Hash a password into a salted Argon2id PHC string.
pub fn hash_credential(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StinkyError::Crypto(format!("Failed to hash password: {}", e)))
}

/// Check a provided password against a stored credential.
pub fn verify_credential(stored: &str, provided: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(provided.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => {
            if stored.starts_with('$') {
                tracing::warn!("stored credential looks like a hash but does not parse");
            }
            blake3::hash(stored.as_bytes()) == blake3::hash(provided.as_bytes())
        }
    }
}

/// Whether a stored credential is a legacy plaintext value.
pub fn needs_rehash(stored: &str) -> bool {
    PasswordHash::new(stored).is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_credential("hunter2").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_credential(&stored, "hunter2"));
        assert!(!verify_credential(&stored, "hunter3"));
        assert!(!needs_rehash(&stored));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_credential("hunter2").unwrap();
        let b = hash_credential("hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_legacy_plaintext_verifies_and_needs_rehash() {
        assert!(verify_credential("hunter2", "hunter2"));
        assert!(!verify_credential("hunter2", "Hunter2"));
        assert!(needs_rehash("hunter2"));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter2").is_ok());
        assert!(validate_password("   ").is_err());
        assert!(validate_password("abc").is_err());
    }
}
