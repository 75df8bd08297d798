//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying notes,
//! accounts and messages in various formats (JSON, table, plain text).

mod json;
mod text;

// Re-export public API
pub use json::{account_json, message_json, note_json, public_note_json, stats_json};
pub use text::{
    print_inbox, print_message, print_note, print_note_list, print_public_notes, print_stats,
    print_users,
};

/// Print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
