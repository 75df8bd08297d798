//! Error types for Stinky core operations.
//!
//! Every filesystem, parse, and cryptographic failure is turned into one of
//! these variants at the component boundary. The CLI layer maps them to
//! user-facing messages and exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Stinky operations.
pub type Result<T> = std::result::Result<T, StinkyError>;

/// Why a decryption attempt failed.
///
/// Both kinds are recoverable: the caller re-prompts for a password or gives
/// up on the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecryptionFailure {
    /// Authentication tag mismatch: wrong password or tampered ciphertext.
    #[error("wrong password or corrupted data")]
    InvalidCredentialOrData,

    /// The stored ciphertext or salt is not valid base64 or has the wrong shape.
    #[error("malformed ciphertext encoding")]
    MalformedInput,
}

/// Core error type for Stinky operations.
#[derive(Debug, Error)]
pub enum StinkyError {
    /// No registry entry for this user
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A registry entry already exists for this user
    #[error("User already exists: {0}")]
    UserExists(String),

    /// The user's note collection has no such note
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// No message with this ID
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// The per-user note file does not exist
    #[error("No note store for user: {0}")]
    StoreMissing(String),

    /// The file exists but cannot be parsed
    #[error("Malformed store file {path}: {reason}")]
    StoreMalformed { path: PathBuf, reason: String },

    /// Password did not match the stored credential
    #[error("Invalid credentials for user: {0}")]
    InvalidCredential(String),

    /// The operation needs a Pro account
    #[error("Pro account required: {0}")]
    ProRequired(String),

    /// Decryption of note or message content failed
    #[error("Decryption failed: {0}")]
    Decryption(#[from] DecryptionFailure),

    /// Key derivation or encryption failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem error, tagged with the file involved
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl StinkyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StinkyError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means something the caller asked for does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StinkyError::UserNotFound(_)
                | StinkyError::NoteNotFound(_)
                | StinkyError::MessageNotFound(_)
                | StinkyError::StoreMissing(_)
        )
    }
}
