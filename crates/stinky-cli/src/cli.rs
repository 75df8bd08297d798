use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use stinky_core::VERSION;

use crate::config::{CipherMode, Privacy};
use crate::constants::env_vars;

/// Stinky - terminal notes with optional per-note encryption
#[derive(Parser)]
#[command(name = "stinky")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding the registry and note files
    #[arg(short, long, global = true, env = env_vars::DATA_DIR)]
    pub data_dir: Option<String>,

    /// Config file path
    #[arg(long, global = true, env = env_vars::CONFIG)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and write a config file
    Init(InitArgs),

    /// Manage user accounts
    #[command(subcommand)]
    User(UserCommand),

    /// Manage a user's notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// List public notes from every user
    Public,

    /// Show note statistics for a user
    Stats {
        #[arg(value_name = "USER")]
        user: String,
    },

    /// Export a user's notes to a text file
    Export {
        #[arg(value_name = "USER")]
        user: String,

        /// Output directory (defaults to <data-dir>/exports)
        #[arg(long, value_name = "DIR")]
        out: Option<String>,
    },

    /// Send and read messages between users
    #[command(subcommand)]
    Message(MessageCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Privacy used when `note add` is given neither --private nor --public
    #[arg(long, value_enum, default_value_t = Privacy::Private)]
    pub default_privacy: Privacy,

    /// How encrypted notes are keyed
    #[arg(long, value_enum, default_value_t = CipherMode::PerNote)]
    pub cipher: CipherMode,

    /// Seal new notes of Pro users with the master passphrase
    #[arg(long)]
    pub encrypt_pro_by_default: bool,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a new user
    Add {
        #[arg(value_name = "USER")]
        user: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Create as a Pro account
        #[arg(long)]
        pro: bool,
    },

    /// Delete a user and all of their notes
    Delete {
        #[arg(value_name = "USER")]
        user: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Change a user's password
    Passwd {
        #[arg(value_name = "USER")]
        user: String,
    },

    /// Turn Pro on (or off with --off)
    Pro {
        #[arg(value_name = "USER")]
        user: String,

        #[arg(long)]
        off: bool,
    },

    /// List registered users
    List,
}

/// Privacy flags shared by `note add` and `note edit`
#[derive(Args, Clone, Copy)]
#[group(multiple = false)]
pub struct PrivacyArgs {
    /// Hide the note from the public listing
    #[arg(long)]
    pub private: bool,

    /// Show the note in the public listing
    #[arg(long)]
    pub public: bool,
}

impl PrivacyArgs {
    /// `Some(is_private)` when a flag was given.
    pub fn choice(self) -> Option<bool> {
        match (self.private, self.public) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Add a note
    Add {
        #[arg(value_name = "USER")]
        user: String,

        /// Note body (overrides stdin/prompt)
        #[arg(long)]
        body: Option<String>,

        #[command(flatten)]
        privacy: PrivacyArgs,

        /// Encrypt the note (Pro only)
        #[arg(long)]
        encrypt: bool,
    },

    /// List a user's notes
    List {
        #[arg(value_name = "USER")]
        user: String,
    },

    /// Show one note, decrypting it if needed
    Show {
        #[arg(value_name = "USER")]
        user: String,

        /// Note ID (full or unique prefix)
        #[arg(value_name = "NOTE_ID")]
        id: String,
    },

    /// Change a note's body or privacy
    Edit {
        #[arg(value_name = "USER")]
        user: String,

        #[arg(value_name = "NOTE_ID")]
        id: String,

        /// New body
        #[arg(long)]
        body: Option<String>,

        #[command(flatten)]
        privacy: PrivacyArgs,
    },

    /// Delete a note
    Delete {
        #[arg(value_name = "USER")]
        user: String,

        #[arg(value_name = "NOTE_ID")]
        id: String,
    },

    /// Encrypt an existing note (Pro only)
    Encrypt {
        #[arg(value_name = "USER")]
        user: String,

        #[arg(value_name = "NOTE_ID")]
        id: String,
    },

    /// Decrypt a note and store it as plain text
    Decrypt {
        #[arg(value_name = "USER")]
        user: String,

        #[arg(value_name = "NOTE_ID")]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum MessageCommand {
    /// Send a message to another user
    Send {
        /// Sender (you)
        #[arg(value_name = "FROM")]
        from: String,

        /// Recipient
        #[arg(value_name = "TO")]
        to: String,

        #[arg(long)]
        subject: String,

        /// Message body (overrides stdin/prompt)
        #[arg(long)]
        body: Option<String>,

        /// Seal the body with a password shared with the recipient
        #[arg(long)]
        encrypt: bool,
    },

    /// List received messages, newest first
    Inbox {
        #[arg(value_name = "USER")]
        user: String,
    },

    /// Read a received message and mark it read
    Read {
        #[arg(value_name = "USER")]
        user: String,

        #[arg(value_name = "MESSAGE_ID")]
        id: String,
    },

    /// Delete a received message
    Delete {
        #[arg(value_name = "USER")]
        user: String,

        #[arg(value_name = "MESSAGE_ID")]
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_privacy_flags_conflict() {
        let result = Cli::try_parse_from([
            "stinky", "note", "add", "alice", "--private", "--public",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_privacy_choice() {
        let cli = Cli::try_parse_from(["stinky", "note", "add", "alice", "--public"]).unwrap();
        match cli.command {
            Some(Commands::Note(NoteCommand::Add { privacy, .. })) => {
                assert_eq!(privacy.choice(), Some(false));
            }
            _ => panic!("expected note add"),
        }
    }
}
