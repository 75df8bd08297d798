//! Key derivation using Argon2id.
//!
//! Note keys are derived from the note password and a random per-note salt,
//! so the same password never yields the same key twice.

use argon2::Argon2;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, StinkyError};

/// Argon2id parameters.
///
/// - Memory: 19 MiB (19 * 1024 KiB)
/// - Iterations: 2
/// - Parallelism: 1
///
/// Changing any of these makes existing encrypted notes undecryptable.
const ARGON2_MEMORY_KB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

/// Length of derived key in bytes (256 bits for XChaCha20-Poly1305).
pub const KEY_LENGTH: usize = 32;

/// Length of freshly generated salts.
pub const SALT_LENGTH: usize = 16;

/// A symmetric key derived from a note password.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Raw key bytes. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Generate a fresh random salt from the OS RNG.
pub fn generate_salt() -> Result<[u8; SALT_LENGTH]> {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt)
        .map_err(|e| StinkyError::Crypto(format!("Failed to generate salt: {}", e)))?;
    Ok(salt)
}

/// Derive a note key from a password using Argon2id.
///
/// Same password + salt always produces the same key; the salt must be
/// stored alongside the ciphertext.
///
/// # Examples
///
/// ```
/// use stinky_core::crypto::derive_key;
///
/// let salt = b"unique-salt-per-note-16b";
/// let key = derive_key("hunter2", salt).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(password: &str, salt: &[u8]) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(StinkyError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    if salt.len() < SALT_LENGTH {
        return Err(StinkyError::InvalidInput(format!(
            "Salt must be at least {} bytes",
            SALT_LENGTH
        )));
    }

    let params = argon2::Params::new(
        ARGON2_MEMORY_KB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(KEY_LENGTH),
    )
    .map_err(|e| StinkyError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key_bytes = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key_bytes)
        .map_err(|e| StinkyError::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey::from_bytes(key_bytes))
}
