//! `stinky user ...` handlers.

use stinky_core::RecordStore;

use crate::app::{login, AppContext};
use crate::cli::UserCommand;
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::helpers::{confirm, is_interactive, prompt_new_secret, prompt_secret};
use crate::output::{account_json, print_json, print_users};
use crate::ui::{print, receipt};

pub fn handle_user(ctx: &AppContext, command: &UserCommand) -> anyhow::Result<()> {
    match command {
        UserCommand::Add { user, name, pro } => handle_add(ctx, user, name, *pro),
        UserCommand::Delete { user, yes } => handle_delete(ctx, user, *yes),
        UserCommand::Passwd { user } => handle_passwd(ctx, user),
        UserCommand::Pro { user, off } => handle_pro(ctx, user, !*off),
        UserCommand::List => handle_list(ctx),
    }
}

fn handle_add(ctx: &AppContext, user: &str, name: &str, pro: bool) -> anyhow::Result<()> {
    let store = ctx.store()?;
    let password = prompt_new_secret(env_vars::PASSWORD, "Password")?;
    store.register_user(user, name, &password, pro)?;

    if ctx.ui().mode.is_json() {
        return print_json(&account_json(user, &store.account(user)?));
    }
    if !ctx.quiet() {
        let ui = ctx.ui();
        let plan = if pro { "pro" } else { "basic" };
        print(ui, &receipt(ui, "User added", &[("User", user), ("Plan", plan)]));
    }
    Ok(())
}

fn handle_delete(ctx: &AppContext, user: &str, yes: bool) -> anyhow::Result<()> {
    login(ctx, user)?;
    if !yes {
        if !is_interactive() {
            return Err(CliError::invalid_input(
                "Refusing to delete without confirmation; pass --yes",
            )
            .into());
        }
        if !confirm(&format!("Delete {} and all of their notes?", user))? {
            print(ctx.ui(), "Aborted.");
            return Ok(());
        }
    }

    ctx.store()?.delete_user(user)?;

    if ctx.ui().mode.is_json() {
        return print_json(&serde_json::json!({ "user_id": user, "deleted": true }));
    }
    if !ctx.quiet() {
        let ui = ctx.ui();
        print(ui, &receipt(ui, "User deleted", &[("User", user)]));
    }
    Ok(())
}

fn handle_passwd(ctx: &AppContext, user: &str) -> anyhow::Result<()> {
    let store = ctx.store()?;
    store.account(user)?;
    let current = prompt_secret(env_vars::PASSWORD, "Current password")?;
    let new = prompt_new_secret(env_vars::NEW_PASSWORD, "New password")?;
    store.change_password(user, &current, &new)?;

    if ctx.ui().mode.is_json() {
        return print_json(&serde_json::json!({ "user_id": user, "password_changed": true }));
    }
    if !ctx.quiet() {
        let ui = ctx.ui();
        print(ui, &receipt(ui, "Password changed", &[("User", user)]));
    }
    Ok(())
}

fn handle_pro(ctx: &AppContext, user: &str, is_pro: bool) -> anyhow::Result<()> {
    login(ctx, user)?;
    let store = ctx.store()?;
    store.set_pro(user, is_pro)?;

    if ctx.ui().mode.is_json() {
        return print_json(&account_json(user, &store.account(user)?));
    }
    if !ctx.quiet() {
        let ui = ctx.ui();
        let plan = if is_pro { "pro" } else { "basic" };
        print(ui, &receipt(ui, "Plan updated", &[("User", user), ("Plan", plan)]));
    }
    Ok(())
}

fn handle_list(ctx: &AppContext) -> anyhow::Result<()> {
    let registry = ctx.store()?.load_registry();

    if ctx.ui().mode.is_json() {
        let users: Vec<_> = registry
            .iter()
            .map(|(user_id, account)| account_json(user_id, account))
            .collect();
        return print_json(&serde_json::Value::Array(users));
    }
    print_users(ctx.ui(), &registry);
    Ok(())
}
