//! Command handlers, one module per command group.

mod init;
mod messages;
mod notes;
mod public;
mod reports;
mod users;

use clap::CommandFactory;
use clap_complete::generate;

use stinky_core::StinkyError;

use crate::cli::Cli;
use crate::errors::CliError;

pub use init::handle_init;
pub use messages::handle_message;
pub use notes::handle_note;
pub use public::handle_public;
pub use reports::{handle_export, handle_stats};
pub use users::handle_user;

pub fn handle_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "stinky", &mut std::io::stdout());
    Ok(())
}

/// Resolve a full ID or a unique prefix of one.
fn resolve_id<'a>(
    ids: impl IntoIterator<Item = &'a String>,
    input: &str,
    kind: &str,
    not_found: impl FnOnce(String) -> StinkyError,
) -> anyhow::Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::invalid_input(format!("{} ID cannot be empty", kind)).into());
    }

    let mut matches = Vec::new();
    for id in ids {
        if id == input {
            return Ok(id.clone());
        }
        if id.starts_with(input) {
            matches.push(id);
        }
    }

    match matches.as_slice() {
        [single] => Ok((*single).clone()),
        [] => Err(not_found(input.to_string()).into()),
        _ => Err(CliError::invalid_input(format!(
            "{} ID prefix \"{}\" matches {} items; use more characters",
            kind,
            input,
            matches.len()
        ))
        .into()),
    }
}
