//! Cryptographic operations for Stinky.
//!
//! - **cipher**: per-note password encryption (Argon2id + XChaCha20-Poly1305)
//! - **master**: master-passphrase keying (Age), an alternate, explicitly
//!   chosen mode that is not key-compatible with per-note encryption
//! - **credential**: salted account password hashes
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the data directory (encrypted note content stays sealed)
//! - Offline brute-force of note passwords (memory-hard KDF)
//!
//! We do NOT defend against:
//! - A compromised OS / keylogger
//! - Concurrent writers racing on the same file

pub mod cipher;
pub mod credential;
pub mod key;
pub mod master;

pub use cipher::EncryptedContent;
pub use credential::{hash_credential, needs_rehash, validate_password, verify_credential};
pub use key::{derive_key, DerivedKey};
pub use master::MasterKey;

use crate::error::{DecryptionFailure, Result};

/// Which key opens (or seals) a piece of content.
#[derive(Debug, Clone, Copy)]
pub enum NoteKey<'a> {
    /// Per-note password; a fresh salt is drawn on every encryption.
    Password(&'a str),
    /// The configured master passphrase.
    Master(&'a MasterKey),
}

/// Sealed content as stored in a record: the token plus, for password
/// keying, its salt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub content: String,
    pub salt: Option<String>,
}

impl NoteKey<'_> {
    /// Encrypt `plaintext` under this key.
    pub fn seal(&self, plaintext: &str) -> Result<Sealed> {
        match self {
            NoteKey::Password(password) => {
                let encrypted = cipher::encrypt(plaintext, password)?;
                Ok(Sealed {
                    content: encrypted.ciphertext,
                    salt: Some(encrypted.salt),
                })
            }
            NoteKey::Master(master) => Ok(Sealed {
                content: master.encrypt(plaintext)?,
                salt: None,
            }),
        }
    }

    /// Decrypt stored content. A salt marks password keying; its absence
    /// marks master keying, so the wrong kind of key fails as a credential
    /// mismatch.
    pub fn open(
        &self,
        content: &str,
        salt: Option<&str>,
    ) -> std::result::Result<String, DecryptionFailure> {
        match (self, salt) {
            (NoteKey::Password(password), Some(salt)) => cipher::decrypt(content, salt, password),
            (NoteKey::Master(master), None) => master.decrypt(content),
            _ => Err(DecryptionFailure::InvalidCredentialOrData),
        }
    }
}
