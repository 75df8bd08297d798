//! Stinky CLI - terminal notes with optional per-note encryption
//!
//! This is the command-line interface for Stinky. It provides a user-friendly
//! interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod ui;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use stinky_core::StinkyError;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::constants::env_vars;
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(err) = run(&cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            cli_err.exit()
        }
        if let Some(core_err) = err.downcast_ref::<StinkyError>() {
            if let Some(cli_err) = CliError::from_core(core_err) {
                cli_err.exit()
            }
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `STINKY_LOG` (default: warnings only).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(env_vars::LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli);

    match &cli.command {
        Some(Commands::Init(args)) => commands::handle_init(&ctx, args),
        Some(Commands::User(command)) => commands::handle_user(&ctx, command),
        Some(Commands::Note(command)) => commands::handle_note(&ctx, command),
        Some(Commands::Public) => commands::handle_public(&ctx),
        Some(Commands::Stats { user }) => commands::handle_stats(&ctx, user),
        Some(Commands::Export { user, out }) => commands::handle_export(&ctx, user, out.as_deref()),
        Some(Commands::Message(command)) => commands::handle_message(&ctx, command),
        Some(Commands::Completions { shell }) => commands::handle_completions(*shell),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
