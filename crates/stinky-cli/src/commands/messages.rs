//! `stinky message ...` handlers.

use stinky_core::storage::messages::open_message;
use stinky_core::storage::{Message, MessageStore, Outgoing};
use stinky_core::StinkyError;

use crate::app::{login, open_with_retry, AppContext};
use crate::cli::MessageCommand;
use crate::constants::env_vars;
use crate::helpers::{prompt_new_secret, read_body};
use crate::output::{message_json, print_inbox, print_json, print_message};
use crate::ui::{print, receipt};

use super::resolve_id;

pub fn handle_message(ctx: &AppContext, command: &MessageCommand) -> anyhow::Result<()> {
    match command {
        MessageCommand::Send {
            from,
            to,
            subject,
            body,
            encrypt,
        } => handle_send(ctx, from, to, subject, body.clone(), *encrypt),
        MessageCommand::Inbox { user } => handle_inbox(ctx, user),
        MessageCommand::Read { user, id } => handle_read(ctx, user, id),
        MessageCommand::Delete { user, id } => handle_delete(ctx, user, id),
    }
}

/// Resolve a message ID among the messages addressed to `user`.
fn find_message(
    messages: &MessageStore<'_>,
    user: &str,
    input: &str,
) -> anyhow::Result<(String, Message)> {
    let inbox = messages.inbox(user);
    let message_id = resolve_id(
        inbox.iter().map(|(id, _)| id),
        input,
        "Message",
        StinkyError::MessageNotFound,
    )?;
    let message = messages.get_for(user, &message_id)?;
    Ok((message_id, message))
}

fn handle_send(
    ctx: &AppContext,
    from: &str,
    to: &str,
    subject: &str,
    body: Option<String>,
    encrypt: bool,
) -> anyhow::Result<()> {
    login(ctx, from)?;
    let store = ctx.store()?;
    store.account(to)?;

    let content = read_body(body, None)?;
    let password = if encrypt {
        Some(prompt_new_secret(env_vars::NOTE_PASSWORD, "Message password")?)
    } else {
        None
    };
    let message_id = store.messages().send_message(Outgoing {
        sender_id: from,
        recipient_id: to,
        subject,
        content: &content,
        password: password.as_ref().map(|p| p.as_str()),
    })?;

    if ctx.ui().mode.is_json() {
        return print_json(&serde_json::json!({
            "id": message_id,
            "from": from,
            "to": to,
            "is_encrypted": encrypt,
        }));
    }
    if !ctx.quiet() {
        let ui = ctx.ui();
        let items = [("Message ID", message_id.as_str()), ("To", to)];
        print(ui, &receipt(ui, "Message sent", &items));
    }
    Ok(())
}

fn handle_inbox(ctx: &AppContext, user: &str) -> anyhow::Result<()> {
    login(ctx, user)?;
    let inbox = ctx.store()?.messages().inbox(user);

    if ctx.ui().mode.is_json() {
        let values: Vec<_> = inbox
            .iter()
            .map(|(message_id, message)| message_json(message_id, message, None))
            .collect();
        return print_json(&serde_json::Value::Array(values));
    }
    print_inbox(ctx.ui(), user, &inbox);
    Ok(())
}

fn handle_read(ctx: &AppContext, user: &str, id: &str) -> anyhow::Result<()> {
    login(ctx, user)?;
    let messages = ctx.store()?.messages();
    let (message_id, message) = find_message(&messages, user, id)?;

    let content = if message.is_encrypted {
        open_with_retry("Message password", |password| {
            open_message(&message, Some(password))
        })?
    } else {
        message.content.clone()
    };
    messages.mark_read(&message_id)?;

    if ctx.ui().mode.is_json() {
        return print_json(&message_json(&message_id, &message, Some(&content)));
    }
    print_message(ctx.ui(), &message_id, &message, &content);
    Ok(())
}

fn handle_delete(ctx: &AppContext, user: &str, id: &str) -> anyhow::Result<()> {
    login(ctx, user)?;
    let messages = ctx.store()?.messages();
    let (message_id, _) = find_message(&messages, user, id)?;
    messages.delete_message(&message_id)?;

    if ctx.ui().mode.is_json() {
        return print_json(&serde_json::json!({ "id": message_id, "deleted": true }));
    }
    if !ctx.quiet() {
        let ui = ctx.ui();
        let items = [("Message ID", message_id.as_str())];
        print(ui, &receipt(ui, "Message deleted", &items));
    }
    Ok(())
}
