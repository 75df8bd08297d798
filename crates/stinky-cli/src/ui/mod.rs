//! UI primitives for the Stinky CLI.
//!
//! This module provides:
//! - **Context**: Environment detection (TTY, width, color, unicode)
//! - **Mode**: Output mode resolution (json, plain, pretty)
//! - **Theme**: Badges, styles, symbols
//! - **Render**: Tables, headers, receipts, hints
//! - **Format**: String utilities (truncate, wrap, previews)

mod context;
pub mod format;
pub mod mode;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use render::{blank_line, divider, header, hint, kv, print, print_warning, receipt, table, Column};

pub use format::{format_datetime, preview, wrap};
