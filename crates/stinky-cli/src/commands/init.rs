use stinky_core::storage::Registry;
use stinky_core::{JsonRecordStore, MasterKey, RecordStore};

use crate::app::{open_master_key, AppContext};
use crate::cli::InitArgs;
use crate::config::{write_config, CipherMode, StinkyConfig};
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::helpers::prompt_new_secret;
use crate::output::print_json;
use crate::ui::{hint, print, print_warning, receipt};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    if args.encrypt_pro_by_default && args.cipher != CipherMode::Master {
        return Err(CliError::invalid_input(
            "--encrypt-pro-by-default needs --cipher master",
        )
        .into());
    }

    let config_path = ctx.config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}. Use --force to overwrite it.",
            config_path.display()
        ))
        .into());
    }

    let data_dir = ctx.data_dir()?;
    let store = JsonRecordStore::new(&data_dir);
    let created = !store.is_initialized();
    if created {
        store.save_registry(&Registry::new())?;
    }
    if args.cipher == CipherMode::Master {
        record_master_check(&store)?;
    }

    let config = StinkyConfig::new(
        &data_dir,
        args.default_privacy,
        args.cipher,
        args.encrypt_pro_by_default,
    );
    write_config(&config_path, &config)?;
    tracing::info!(
        data_dir = %data_dir.display(),
        config = %config_path.display(),
        created,
        "initialized"
    );

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&serde_json::json!({
            "data_dir": data_dir,
            "config": config_path,
            "created": created,
        }));
    }
    if ctx.quiet() {
        return Ok(());
    }

    let data_dir_display = data_dir.display().to_string();
    let config_display = config_path.display().to_string();
    if !created {
        print_warning(ui, "Data directory already initialized; existing data kept");
    }
    print(
        ui,
        &receipt(
            ui,
            "Initialized Stinky",
            &[("Data dir", data_dir_display.as_str()), ("Config", config_display.as_str())],
        ),
    );
    if args.cipher == CipherMode::Master {
        print(
            ui,
            &hint(
                ui,
                "The master passphrase is asked for when notes are read or written; only a check value is stored.",
            ),
        );
    }
    print(ui, &hint(ui, "Next: stinky user add <USER> --name <NAME>"));
    Ok(())
}

/// Choose the master passphrase, or confirm the one already in use.
fn record_master_check(store: &JsonRecordStore) -> anyhow::Result<()> {
    if store.master_check_path().exists() {
        open_master_key(store)?;
        return Ok(());
    }
    let passphrase = prompt_new_secret(env_vars::MASTER_PASSPHRASE, "Master passphrase")?;
    store.check_master(&MasterKey::new(&passphrase)?)?;
    Ok(())
}
