//! Application context for the Stinky CLI.
//!
//! Bundles the parsed CLI arguments with lazily-loaded configuration and
//! record stores, so handlers take one parameter.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use stinky_core::{JsonRecordStore, StoreOptions};

use crate::cli::Cli;
use crate::config::{default_config_path, default_data_dir, load_config, CipherMode, StinkyConfig};
use crate::errors::CliError;
use crate::ui::UiContext;

use super::auth::open_master_key;

pub struct AppContext<'a> {
    cli: &'a Cli,
    ui: UiContext,
    config: OnceCell<StinkyConfig>,
    store: OnceCell<JsonRecordStore>,
    note_store: OnceCell<JsonRecordStore>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            ui: UiContext::from_env(cli.json, cli.no_color),
            config: OnceCell::new(),
            store: OnceCell::new(),
            note_store: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn ui(&self) -> &UiContext {
        &self.ui
    }

    /// Config file path: `--config` / `STINKY_CONFIG`, else the XDG default.
    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match self.cli.config.as_deref() {
            Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
            _ => default_config_path(),
        }
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&StinkyConfig> {
        self.config
            .get_or_try_init(|| load_config(&self.config_path()?))
    }

    /// Data directory: `--data-dir` / `STINKY_DATA_DIR`, then config, then
    /// the XDG default.
    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = self.cli.data_dir.as_deref() {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = self.config()?.storage.data_dir.as_deref() {
            return Ok(PathBuf::from(dir));
        }
        default_data_dir()
    }

    /// Record store for account and listing commands (no master key).
    pub fn store(&self) -> anyhow::Result<&JsonRecordStore> {
        self.store.get_or_try_init(|| {
            let store = JsonRecordStore::new(self.data_dir()?);
            ensure_initialized(&store)?;
            Ok(store)
        })
    }

    /// Record store for commands that read or write note content.
    ///
    /// In master cipher mode this asks for the master passphrase once and
    /// checks it before anything is sealed with it.
    pub fn note_store(&self) -> anyhow::Result<&JsonRecordStore> {
        self.note_store.get_or_try_init(|| {
            let config = self.config()?;
            let data_dir = self.data_dir()?;
            let master = match config.cipher.mode {
                CipherMode::Master => {
                    let store = self.store()?;
                    Some(open_master_key(store)?)
                }
                CipherMode::PerNote => None,
            };
            let store = JsonRecordStore::with_options(
                data_dir,
                StoreOptions {
                    master,
                    encrypt_pro_by_default: config.cipher.encrypt_pro_by_default,
                },
            );
            ensure_initialized(&store)?;
            Ok(store)
        })
    }
}

fn ensure_initialized(store: &JsonRecordStore) -> anyhow::Result<()> {
    if store.is_initialized() {
        return Ok(());
    }
    Err(CliError::not_found(
        format!("No Stinky data found at {}", store.root().display()),
        "Hint: Run `stinky init` first, or pass --data-dir.",
    )
    .into())
}
