//! Per-note password encryption.
//!
//! Each call to [`encrypt`] draws a fresh salt and a fresh nonce, derives a
//! key with Argon2id and seals the content with XChaCha20-Poly1305. The token
//! stored in the note record is
//!
//! ```text
//! version (1 byte) || nonce (24 bytes) || ciphertext || tag (16 bytes)
//! ```
//!
//! base64-encoded, with the salt stored next to it as its own base64 string.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use zeroize::Zeroizing;

use super::key::{derive_key, generate_salt, SALT_LENGTH};
use crate::error::{DecryptionFailure, Result, StinkyError};

const TOKEN_VERSION: u8 = 0x01;
const NONCE_LENGTH: usize = 24;
const TAG_LENGTH: usize = 16;

/// Ciphertext and salt, both base64 strings safe to store as opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedContent {
    pub ciphertext: String,
    pub salt: String,
}

/// Encrypt `plaintext` under a key derived from `password` and a new salt.
///
/// # Examples
///
/// ```
/// use stinky_core::crypto::cipher::{decrypt, encrypt};
///
/// let sealed = encrypt("top secret", "pw1").unwrap();
/// assert_eq!(decrypt(&sealed.ciphertext, &sealed.salt, "pw1").unwrap(), "top secret");
/// ```
pub fn encrypt(plaintext: &str, password: &str) -> Result<EncryptedContent> {
    let salt = generate_salt()?;
    let key = derive_key(password, &salt)?;

    let mut nonce = [0u8; NONCE_LENGTH];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| StinkyError::Crypto(format!("Failed to generate nonce: {}", e)))?;

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let sealed = cipher
        .encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: plaintext.as_bytes(),
                aad: &[TOKEN_VERSION],
            },
        )
        .map_err(|_| StinkyError::Crypto("AEAD encryption failed".to_string()))?;

    let mut token = Vec::with_capacity(1 + NONCE_LENGTH + sealed.len());
    token.push(TOKEN_VERSION);
    token.extend_from_slice(&nonce);
    token.extend_from_slice(&sealed);

    Ok(EncryptedContent {
        ciphertext: STANDARD.encode(token),
        salt: STANDARD.encode(salt),
    })
}

/// Decrypt a token produced by [`encrypt`].
///
/// Returns [`DecryptionFailure::MalformedInput`] when the token or salt cannot
/// be decoded, and [`DecryptionFailure::InvalidCredentialOrData`] when the
/// authentication tag does not verify.
pub fn decrypt(
    ciphertext: &str,
    salt: &str,
    password: &str,
) -> std::result::Result<String, DecryptionFailure> {
    let token = STANDARD
        .decode(ciphertext.trim())
        .map_err(|_| DecryptionFailure::MalformedInput)?;
    let salt = STANDARD
        .decode(salt.trim())
        .map_err(|_| DecryptionFailure::MalformedInput)?;

    if salt.len() < SALT_LENGTH || token.len() < 1 + NONCE_LENGTH + TAG_LENGTH {
        return Err(DecryptionFailure::MalformedInput);
    }
    if token[0] != TOKEN_VERSION {
        return Err(DecryptionFailure::MalformedInput);
    }
    if password.is_empty() {
        return Err(DecryptionFailure::InvalidCredentialOrData);
    }

    let key = derive_key(password, &salt).map_err(|err| {
        tracing::warn!(error = %err, "note key derivation failed");
        DecryptionFailure::InvalidCredentialOrData
    })?;

    let (nonce, sealed) = token[1..].split_at(NONCE_LENGTH);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: &[TOKEN_VERSION],
                },
            )
            .map_err(|_| DecryptionFailure::InvalidCredentialOrData)?,
    );

    String::from_utf8(plaintext.to_vec()).map_err(|_| DecryptionFailure::MalformedInput)
}
