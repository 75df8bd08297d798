//! Account login and note-password prompts with retry logic.

use zeroize::Zeroizing;

use stinky_core::storage::UserAccount;
use stinky_core::{DecryptionFailure, JsonRecordStore, MasterKey, NoteKey, StinkyError};

use crate::constants::{env_vars, MAX_PASSWORD_ATTEMPTS};
use crate::errors::CliError;
use crate::helpers::{env_secret, is_interactive, prompt_new_secret, prompt_secret};

use super::context::AppContext;

/// Check `user_id`'s account password.
///
/// Reads `STINKY_PASSWORD` if set (one attempt), otherwise prompts up to
/// three times.
pub fn login(ctx: &AppContext, user_id: &str) -> anyhow::Result<UserAccount> {
    let store = ctx.store()?;
    // Unknown users fail before any prompt.
    store.account(user_id)?;

    let account = retry_secret(
        env_vars::PASSWORD,
        &format!("Password for {}", user_id),
        "Incorrect password.",
        "Hint: Account passwords cannot be recovered; ask whoever manages this data directory.",
        |password| store.authenticate(user_id, password),
    )?;
    tracing::debug!(user_id, "logged in");
    Ok(account)
}

/// Run `attempt` with a note or message password, re-prompting when the
/// password is wrong.
pub fn open_with_retry<T>(
    prompt: &str,
    attempt: impl FnMut(&str) -> stinky_core::Result<T>,
) -> anyhow::Result<T> {
    retry_secret(
        env_vars::NOTE_PASSWORD,
        prompt,
        "Wrong password or corrupted data.",
        "Hint: Encrypted content cannot be recovered without its password.",
        attempt,
    )
}

/// Ask for the master passphrase until it matches this data directory.
pub fn open_master_key(store: &JsonRecordStore) -> anyhow::Result<MasterKey> {
    retry_secret(
        env_vars::MASTER_PASSPHRASE,
        "Master passphrase",
        "Wrong master passphrase.",
        "Hint: Master-keyed notes cannot be recovered without the passphrase set at init.",
        |passphrase| {
            let master = MasterKey::new(passphrase)?;
            store.check_master(&master)?;
            Ok(master)
        },
    )
}

/// Key used to seal new content.
pub enum SealKey<'a> {
    Master(&'a MasterKey),
    Password(Zeroizing<String>),
}

impl SealKey<'_> {
    pub fn note_key(&self) -> NoteKey<'_> {
        match self {
            SealKey::Master(master) => NoteKey::Master(*master),
            SealKey::Password(password) => NoteKey::Password(password.as_str()),
        }
    }
}

/// The master key when configured, otherwise a freshly chosen note password.
pub fn seal_key(store: &JsonRecordStore) -> anyhow::Result<SealKey<'_>> {
    match store.master_key() {
        Some(master) => Ok(SealKey::Master(master)),
        None => Ok(SealKey::Password(prompt_new_secret(
            env_vars::NOTE_PASSWORD,
            "Note password",
        )?)),
    }
}

fn retry_secret<T>(
    env_var: &str,
    prompt: &str,
    failure: &str,
    hint: &str,
    mut attempt: impl FnMut(&str) -> stinky_core::Result<T>,
) -> anyhow::Result<T> {
    let from_env = env_secret(env_var);
    let max_attempts: u32 = if from_env.is_none() && is_interactive() {
        MAX_PASSWORD_ATTEMPTS
    } else {
        1
    };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let secret = match from_env.as_ref() {
            Some(value) => value.clone(),
            None => prompt_secret(env_var, prompt)?,
        };
        match attempt(secret.as_str()) {
            Ok(value) => return Ok(value),
            Err(err) if is_wrong_secret(&err) => {
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    if max_attempts == 1 {
                        CliError::auth_failed_with_hint(failure, hint).exit()
                    }
                    CliError::auth_failed_with_hint("Too many failed password attempts.", hint)
                        .exit()
                }
                eprintln!(
                    "{} {} attempt{} remaining.",
                    failure,
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn is_wrong_secret(err: &StinkyError) -> bool {
    matches!(
        err,
        StinkyError::InvalidCredential(_)
            | StinkyError::Decryption(DecryptionFailure::InvalidCredentialOrData)
    )
}
