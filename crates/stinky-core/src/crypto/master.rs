//! Master-passphrase keying.
//!
//! In this mode one configured passphrase encrypts Pro content transparently,
//! using Age's passphrase recipients. It is not key-compatible with per-note
//! password encryption: a note sealed here has no salt in its record and can
//! only be opened with the same master passphrase.

use std::io::{Read, Write};
use std::iter;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{DecryptionFailure, Result, StinkyError};

const CHECK_PLAINTEXT: &str = "stinky master passphrase check v1";

/// The process-wide master passphrase, passed in explicitly at construction.
pub struct MasterKey {
    passphrase: SecretString,
}

impl MasterKey {
    pub fn new(passphrase: &str) -> Result<Self> {
        if passphrase.trim().is_empty() {
            return Err(StinkyError::InvalidInput(
                "Master passphrase cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            passphrase: SecretString::from(passphrase.to_string()),
        })
    }

    /// Encrypt `plaintext`, returning base64 of the Age ciphertext.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let encryptor = age::Encryptor::with_user_passphrase(self.secret());

        let mut encrypted = Vec::new();
        let mut writer = encryptor
            .wrap_output(&mut encrypted)
            .map_err(|e| StinkyError::Crypto(format!("Failed to create encryptor: {}", e)))?;

        writer
            .write_all(plaintext.as_bytes())
            .map_err(|e| StinkyError::Crypto(format!("Encryption write failed: {}", e)))?;

        writer
            .finish()
            .map_err(|e| StinkyError::Crypto(format!("Encryption finish failed: {}", e)))?;

        Ok(STANDARD.encode(encrypted))
    }

    /// Decrypt a token produced by [`MasterKey::encrypt`].
    pub fn decrypt(&self, token: &str) -> std::result::Result<String, DecryptionFailure> {
        let encrypted = STANDARD
            .decode(token.trim())
            .map_err(|_| DecryptionFailure::MalformedInput)?;

        let decryptor = age::Decryptor::new(&encrypted[..])
            .map_err(|_| DecryptionFailure::MalformedInput)?;

        let identity = age::scrypt::Identity::new(self.secret());
        let mut reader = decryptor
            .decrypt(iter::once(&identity as &dyn age::Identity))
            .map_err(|e| match e {
                age::DecryptError::NoMatchingKeys
                | age::DecryptError::DecryptionFailed
                | age::DecryptError::KeyDecryptionFailed => {
                    DecryptionFailure::InvalidCredentialOrData
                }
                other => {
                    tracing::debug!(error = %other, "master-key token rejected");
                    DecryptionFailure::MalformedInput
                }
            })?;

        let mut decrypted = Vec::new();
        reader
            .read_to_end(&mut decrypted)
            .map_err(|_| DecryptionFailure::InvalidCredentialOrData)?;

        String::from_utf8(decrypted).map_err(|_| DecryptionFailure::MalformedInput)
    }

    /// Token that opens to a fixed value under this passphrase only.
    pub fn check_token(&self) -> Result<String> {
        self.encrypt(CHECK_PLAINTEXT)
    }

    /// Confirm `token` came from [`MasterKey::check_token`] with this passphrase.
    pub fn verify_check(&self, token: &str) -> std::result::Result<(), DecryptionFailure> {
        if self.decrypt(token)? == CHECK_PLAINTEXT {
            Ok(())
        } else {
            Err(DecryptionFailure::MalformedInput)
        }
    }

    fn secret(&self) -> SecretString {
        SecretString::from(self.passphrase.expose_secret().to_string())
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}
