//! # Stinky Core
//!
//! Core library for Stinky, a terminal note keeper with optional per-note
//! encryption.
//!
//! This crate provides the record store, the note cipher and the data models,
//! independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **storage**: user registry, per-user note files, message book
//! - **crypto**: note cipher, master keying, account credentials
//! - **stats**: per-user note statistics
//! - **export**: plain-text note export
//! - **fs**: atomic whole-file writes

pub mod crypto;
pub mod error;
pub mod export;
pub mod fs;
pub mod stats;
pub mod storage;

pub use crypto::{MasterKey, NoteKey};
pub use error::{DecryptionFailure, Result, StinkyError};
pub use stats::NoteStats;
pub use storage::{JsonRecordStore, RecordStore, StoreOptions};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
