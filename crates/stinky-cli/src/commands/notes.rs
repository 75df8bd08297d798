//! `stinky note ...` handlers.

use zeroize::Zeroizing;

use stinky_core::storage::{NoteRecord, NoteUpdate, UserNoteCollection};
use stinky_core::{NoteKey, RecordStore, StinkyError};

use crate::app::{login, open_with_retry, seal_key, AppContext};
use crate::cli::{NoteCommand, PrivacyArgs};
use crate::errors::CliError;
use crate::helpers::read_body;
use crate::output::{note_json, print_json, print_note, print_note_list};
use crate::ui::{print, receipt};

use super::resolve_id;

pub fn handle_note(ctx: &AppContext, command: &NoteCommand) -> anyhow::Result<()> {
    match command {
        NoteCommand::Add {
            user,
            body,
            privacy,
            encrypt,
        } => handle_add(ctx, user, body.clone(), *privacy, *encrypt),
        NoteCommand::List { user } => handle_list(ctx, user),
        NoteCommand::Show { user, id } => handle_show(ctx, user, id),
        NoteCommand::Edit {
            user,
            id,
            body,
            privacy,
        } => handle_edit(ctx, user, id, body.clone(), *privacy),
        NoteCommand::Delete { user, id } => handle_delete(ctx, user, id),
        NoteCommand::Encrypt { user, id } => handle_encrypt(ctx, user, id),
        NoteCommand::Decrypt { user, id } => handle_decrypt(ctx, user, id),
    }
}

fn resolve_note(collection: &UserNoteCollection, input: &str) -> anyhow::Result<String> {
    resolve_id(collection.notes.keys(), input, "Note", StinkyError::NoteNotFound)
}

/// Look up a note by full ID or prefix, returning its full ID and record.
fn find_note(ctx: &AppContext, user: &str, input: &str) -> anyhow::Result<(String, NoteRecord)> {
    let mut collection = ctx.store()?.list_notes(user)?;
    let note_id = resolve_note(&collection, input)?;
    let record = collection
        .notes
        .swap_remove(&note_id)
        .ok_or_else(|| StinkyError::NoteNotFound(note_id.clone()))?;
    Ok((note_id, record))
}

fn require_pro(user: &str, is_pro: bool) -> anyhow::Result<()> {
    if is_pro {
        return Ok(());
    }
    Err(StinkyError::ProRequired(format!("{} needs a Pro account to encrypt notes", user)).into())
}

fn print_receipt(ctx: &AppContext, title: &str, note_id: &str) {
    let ui = ctx.ui();
    if !ctx.quiet() {
        print(ui, &receipt(ui, title, &[("Note ID", note_id)]));
    }
}

/// The plaintext of `record`, asking for whatever key it needs.
fn open_note(
    ctx: &AppContext,
    user: &str,
    note_id: &str,
    record: &NoteRecord,
) -> anyhow::Result<String> {
    if !record.is_encrypted {
        return Ok(record.content.clone());
    }
    if record.is_master_keyed() {
        return Ok(ctx.note_store()?.read_note(user, note_id, None)?);
    }
    let store = ctx.store()?;
    open_with_retry("Note password", |password| {
        store.read_note(user, note_id, Some(NoteKey::Password(password)))
    })
}

fn handle_add(
    ctx: &AppContext,
    user: &str,
    body: Option<String>,
    privacy: PrivacyArgs,
    encrypt: bool,
) -> anyhow::Result<()> {
    let account = login(ctx, user)?;
    if encrypt {
        require_pro(user, account.is_pro)?;
    }

    let is_private = match privacy.choice() {
        Some(is_private) => is_private,
        None => ctx.config()?.notes.default_privacy.is_private(),
    };
    let content = read_body(body, None)?;

    let store = ctx.note_store()?;
    let note_id = if encrypt {
        let key = seal_key(store)?;
        store.create_encrypted_note(user, &content, is_private, key.note_key())?
    } else {
        store.create_note(user, &content, is_private)?
    };

    if ctx.ui().mode.is_json() {
        let record = store.get_note(user, &note_id)?;
        return print_json(&note_json(&note_id, &record, None));
    }
    print_receipt(ctx, "Note added", &note_id);
    Ok(())
}

fn handle_list(ctx: &AppContext, user: &str) -> anyhow::Result<()> {
    login(ctx, user)?;
    let collection = ctx.store()?.list_notes(user)?;

    if ctx.ui().mode.is_json() {
        let notes: Vec<_> = collection
            .notes
            .iter()
            .map(|(note_id, record)| note_json(note_id, record, None))
            .collect();
        return print_json(&serde_json::Value::Array(notes));
    }
    print_note_list(ctx.ui(), &collection);
    Ok(())
}

fn handle_show(ctx: &AppContext, user: &str, id: &str) -> anyhow::Result<()> {
    login(ctx, user)?;
    let (note_id, record) = find_note(ctx, user, id)?;
    let content = open_note(ctx, user, &note_id, &record)?;

    if ctx.ui().mode.is_json() {
        return print_json(&note_json(&note_id, &record, Some(&content)));
    }
    print_note(ctx.ui(), &note_id, &record, &content);
    Ok(())
}

fn handle_edit(
    ctx: &AppContext,
    user: &str,
    id: &str,
    body: Option<String>,
    privacy: PrivacyArgs,
) -> anyhow::Result<()> {
    login(ctx, user)?;
    let (note_id, record) = find_note(ctx, user, id)?;
    let store = ctx.store()?;

    // With no flags at all the body is edited interactively.
    let wants_body = body.is_some() || privacy.choice().is_none();

    if record.is_encrypted && wants_body {
        if record.is_master_keyed() {
            let note_store = ctx.note_store()?;
            let current = note_store.read_note(user, &note_id, None)?;
            let content = read_body(body, Some(&current))?;
            note_store.edit_encrypted_note(user, &note_id, &content, privacy.choice(), None)?;
        } else {
            let (current, password) = open_with_retry("Note password", |password| {
                store
                    .read_note(user, &note_id, Some(NoteKey::Password(password)))
                    .map(|content| (content, Zeroizing::new(password.to_string())))
            })?;
            let content = read_body(body, Some(&current))?;
            store.edit_encrypted_note(
                user,
                &note_id,
                &content,
                privacy.choice(),
                Some(NoteKey::Password(password.as_str())),
            )?;
        }
    } else {
        let mut update = NoteUpdate::new();
        if wants_body {
            update = update.content(read_body(body, Some(&record.content))?);
        }
        if let Some(is_private) = privacy.choice() {
            update = update.privacy(is_private);
        }
        store.edit_note(user, &note_id, &update)?;
    }

    if ctx.ui().mode.is_json() {
        let record = store.get_note(user, &note_id)?;
        return print_json(&note_json(&note_id, &record, None));
    }
    print_receipt(ctx, "Note updated", &note_id);
    Ok(())
}

fn handle_delete(ctx: &AppContext, user: &str, id: &str) -> anyhow::Result<()> {
    login(ctx, user)?;
    let (note_id, _) = find_note(ctx, user, id)?;
    ctx.store()?.delete_note(user, &note_id)?;

    if ctx.ui().mode.is_json() {
        return print_json(&serde_json::json!({ "id": note_id, "deleted": true }));
    }
    print_receipt(ctx, "Note deleted", &note_id);
    Ok(())
}

fn handle_encrypt(ctx: &AppContext, user: &str, id: &str) -> anyhow::Result<()> {
    let account = login(ctx, user)?;
    require_pro(user, account.is_pro)?;

    let (note_id, record) = find_note(ctx, user, id)?;
    if record.is_encrypted {
        return Err(CliError::invalid_input(format!("Note {} is already encrypted", note_id)).into());
    }

    let store = ctx.note_store()?;
    let key = seal_key(store)?;
    store.encrypt_note(user, &note_id, key.note_key())?;

    if ctx.ui().mode.is_json() {
        let record = store.get_note(user, &note_id)?;
        return print_json(&note_json(&note_id, &record, None));
    }
    print_receipt(ctx, "Note encrypted", &note_id);
    Ok(())
}

fn handle_decrypt(ctx: &AppContext, user: &str, id: &str) -> anyhow::Result<()> {
    login(ctx, user)?;
    let (note_id, record) = find_note(ctx, user, id)?;
    if !record.is_encrypted {
        return Err(CliError::invalid_input(format!("Note {} is not encrypted", note_id)).into());
    }

    if record.is_master_keyed() {
        ctx.note_store()?.decrypt_note(user, &note_id, None)?;
    } else {
        let store = ctx.store()?;
        open_with_retry("Note password", |password| {
            store.decrypt_note(user, &note_id, Some(NoteKey::Password(password)))
        })?;
    }

    if ctx.ui().mode.is_json() {
        let record = ctx.store()?.get_note(user, &note_id)?;
        return print_json(&note_json(&note_id, &record, None));
    }
    print_receipt(ctx, "Note decrypted", &note_id);
    Ok(())
}
