//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use stinky_core::{DecryptionFailure, StinkyError};

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (data directory, user, note, message)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong password, too many attempts)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: None,
        }
    }

    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Classify a core error, if it has a dedicated exit code.
    pub fn from_core(err: &StinkyError) -> Option<Self> {
        let mapped = match err {
            StinkyError::UserNotFound(user_id) => CliError::not_found(
                format!("User \"{}\" not found", user_id),
                "Hint: Run `stinky user list` to see registered users.",
            ),
            StinkyError::NoteNotFound(note_id) => CliError::not_found(
                format!("Note \"{}\" not found", note_id),
                "Hint: Run `stinky note list <USER>` to find note IDs.",
            ),
            StinkyError::MessageNotFound(message_id) => CliError::not_found(
                format!("Message \"{}\" not found", message_id),
                "Hint: Run `stinky message inbox <USER>` to find message IDs.",
            ),
            StinkyError::StoreMissing(user_id) => CliError::not_found(
                format!("No note store for user \"{}\"", user_id),
                "Hint: The account may have been created by hand; re-add the user.",
            ),
            StinkyError::InvalidCredential(_) => CliError::auth_failed("Incorrect password."),
            StinkyError::Decryption(DecryptionFailure::InvalidCredentialOrData) => {
                CliError::auth_failed_with_hint(
                    "Wrong password or corrupted data.",
                    "Hint: Encrypted notes cannot be recovered without their password.",
                )
            }
            StinkyError::InvalidInput(message) => CliError::invalid_input(message.clone()),
            StinkyError::UserExists(_) | StinkyError::ProRequired(_) => {
                CliError::invalid_input(err.to_string())
            }
            _ => return None,
        };
        Some(mapped)
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}
