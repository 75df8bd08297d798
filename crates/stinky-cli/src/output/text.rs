//! Text and table output for notes, accounts and messages.

use stinky_core::storage::{Message, NoteRecord, PublicNote, Registry, UserNoteCollection};
use stinky_core::NoteStats;

use crate::ui::theme::{styled, styles, LOCK, UNREAD};
use crate::ui::{
    blank_line, divider, format_datetime, header, kv, preview, print, table, wrap, Column,
    UiContext,
};

const PREVIEW_WIDTH: usize = 48;

fn privacy_label(is_private: bool) -> &'static str {
    if is_private {
        "private"
    } else {
        "public"
    }
}

fn lock_marker(ctx: &UiContext, is_encrypted: bool) -> String {
    if is_encrypted {
        LOCK.get(ctx.unicode).to_string()
    } else {
        String::new()
    }
}

/// Print a user's notes, oldest first.
pub fn print_note_list(ctx: &UiContext, collection: &UserNoteCollection) {
    print(ctx, &header(ctx, "note list", Some(&collection.user_id)));
    if collection.notes.is_empty() {
        print(ctx, "No notes.");
        return;
    }

    let rows: Vec<Vec<String>> = collection
        .notes
        .iter()
        .map(|(note_id, record)| {
            vec![
                note_id.clone(),
                privacy_label(record.is_private).to_string(),
                lock_marker(ctx, record.is_encrypted),
                format_datetime(&record.updated_at, ctx.mode.is_pretty()),
                preview(&record.content, record.is_encrypted, PREVIEW_WIDTH),
            ]
        })
        .collect();
    let columns = [
        Column::new("ID"),
        Column::new("PRIVACY"),
        Column::new(""),
        Column::new("UPDATED"),
        Column::new("PREVIEW"),
    ];
    print(ctx, &table(ctx, &columns, &rows));
}

/// Print one note with its (already decrypted) content.
pub fn print_note(ctx: &UiContext, note_id: &str, record: &NoteRecord, content: &str) {
    let pretty = ctx.mode.is_pretty();
    print(ctx, &kv(ctx, "Note ID", note_id));
    print(ctx, &kv(ctx, "Privacy", privacy_label(record.is_private)));
    print(ctx, &kv(ctx, "Encrypted", if record.is_encrypted { "yes" } else { "no" }));
    print(ctx, &kv(ctx, "Created", &format_datetime(&record.created_at, pretty)));
    print(ctx, &kv(ctx, "Updated", &format_datetime(&record.updated_at, pretty)));
    print(ctx, &divider(ctx));
    if pretty {
        for line in wrap(content, ctx.width.saturating_sub(2).max(20)) {
            print(ctx, &line);
        }
    } else {
        print(ctx, content);
    }
}

/// Print the public notes of every user.
pub fn print_public_notes(ctx: &UiContext, notes: &[PublicNote]) {
    print(ctx, &header(ctx, "public", None));
    if notes.is_empty() {
        print(ctx, "No public notes.");
        return;
    }

    let rows: Vec<Vec<String>> = notes
        .iter()
        .map(|note| {
            vec![
                note.user_id.clone(),
                note.note_id.clone(),
                format_datetime(&note.record.created_at, ctx.mode.is_pretty()),
                preview(&note.record.content, note.record.is_encrypted, PREVIEW_WIDTH),
            ]
        })
        .collect();
    let columns = [
        Column::new("USER"),
        Column::new("ID"),
        Column::new("CREATED"),
        Column::new("PREVIEW"),
    ];
    print(ctx, &table(ctx, &columns, &rows));
}

/// Print registered users, without credentials.
pub fn print_users(ctx: &UiContext, registry: &Registry) {
    print(ctx, &header(ctx, "user list", None));
    if registry.is_empty() {
        print(ctx, "No users.");
        return;
    }

    let rows: Vec<Vec<String>> = registry
        .iter()
        .map(|(user_id, account)| {
            vec![
                user_id.clone(),
                account.full_name.clone(),
                if account.is_pro { "pro" } else { "basic" }.to_string(),
            ]
        })
        .collect();
    let columns = [Column::new("USER"), Column::new("NAME"), Column::new("PLAN")];
    print(ctx, &table(ctx, &columns, &rows));
}

pub fn print_stats(ctx: &UiContext, user_id: &str, stats: &NoteStats, unread_messages: usize) {
    let pretty = ctx.mode.is_pretty();
    print(ctx, &header(ctx, "stats", Some(user_id)));
    blank_line(ctx);
    print(ctx, &kv(ctx, "Total notes", &stats.total.to_string()));
    print(ctx, &kv(ctx, "Private", &stats.private.to_string()));
    print(ctx, &kv(ctx, "Public", &stats.public.to_string()));
    print(ctx, &kv(ctx, "Encrypted", &stats.encrypted.to_string()));
    print(ctx, &kv(ctx, "Plaintext chars", &stats.plaintext_chars.to_string()));
    if let Some(oldest) = stats.oldest.as_ref() {
        print(ctx, &kv(ctx, "Oldest", &format_datetime(oldest, pretty)));
    }
    if let Some(newest) = stats.newest.as_ref() {
        print(ctx, &kv(ctx, "Newest", &format_datetime(newest, pretty)));
    }
    print(ctx, &kv(ctx, "Unread messages", &unread_messages.to_string()));
}

/// Print a user's inbox, newest first.
pub fn print_inbox(ctx: &UiContext, user_id: &str, messages: &[(String, Message)]) {
    print(ctx, &header(ctx, "message inbox", Some(user_id)));
    if messages.is_empty() {
        print(ctx, "No messages.");
        return;
    }

    let rows: Vec<Vec<String>> = messages
        .iter()
        .map(|(message_id, message)| {
            let unread = if message.read {
                String::new()
            } else {
                styled(UNREAD.get(ctx.unicode), styles::accent(), ctx.color)
            };
            vec![
                unread,
                message_id.clone(),
                message.sender_id.clone(),
                format_datetime(&message.timestamp, ctx.mode.is_pretty()),
                format!("{}{}", message.subject, lock_suffix(ctx, message.is_encrypted)),
            ]
        })
        .collect();
    let columns = [
        Column::new(""),
        Column::new("ID"),
        Column::new("FROM"),
        Column::new("SENT"),
        Column::new("SUBJECT"),
    ];
    print(ctx, &table(ctx, &columns, &rows));
}

fn lock_suffix(ctx: &UiContext, is_encrypted: bool) -> String {
    if is_encrypted {
        format!(" {}", LOCK.get(ctx.unicode))
    } else {
        String::new()
    }
}

pub fn print_message(ctx: &UiContext, message_id: &str, message: &Message, content: &str) {
    print(ctx, &kv(ctx, "Message ID", message_id));
    print(ctx, &kv(ctx, "From", &message.sender_id));
    print(ctx, &kv(ctx, "Subject", &message.subject));
    print(
        ctx,
        &kv(ctx, "Sent", &format_datetime(&message.timestamp, ctx.mode.is_pretty())),
    );
    print(ctx, &divider(ctx));
    print(ctx, content);
}
