//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (clap usage errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (data directory, user, note, message).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong password, too many attempts).
    pub const AUTH_FAILED: i32 = 5;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    pub const CONFIG: &str = "STINKY_CONFIG";
    pub const DATA_DIR: &str = "STINKY_DATA_DIR";
    pub const LOG: &str = "STINKY_LOG";
    /// Account password for the user a command acts as
    pub const PASSWORD: &str = "STINKY_PASSWORD";
    /// Replacement password for `user passwd`
    pub const NEW_PASSWORD: &str = "STINKY_NEW_PASSWORD";
    /// Per-note and per-message encryption password
    pub const NOTE_PASSWORD: &str = "STINKY_NOTE_PASSWORD";
    pub const MASTER_PASSPHRASE: &str = "STINKY_MASTER_PASSPHRASE";
}

/// Password prompts allowed on a terminal before giving up.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;
