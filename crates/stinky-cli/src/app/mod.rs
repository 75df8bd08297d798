//! Application-level utilities for the Stinky CLI.
//!
//! This module provides:
//! - The command context (config, data directory, record stores)
//! - Login, master passphrase and note-password handling with retry logic

mod auth;
mod context;

pub use auth::{login, open_master_key, open_with_retry, seal_key, SealKey};
pub use context::AppContext;
