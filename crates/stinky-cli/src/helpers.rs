//! Input helpers for the CLI: secrets, note bodies, confirmations.

use std::io::{self, IsTerminal, Read};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use dialoguer::{Confirm, Input, Password};
use zeroize::Zeroizing;

/// Whether stdin is a terminal we can prompt on.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// A secret supplied through the environment, if set and non-blank.
pub fn env_secret(env_var: &str) -> Option<Zeroizing<String>> {
    std::env::var(env_var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Zeroizing::new)
}

/// Read a secret from `env_var`, or prompt for it.
pub fn prompt_secret(env_var: &str, prompt: &str) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = env_secret(env_var) {
        return Ok(value);
    }
    if !is_interactive() {
        return Err(anyhow::anyhow!(
            "No {} provided and no TTY available. Set {}.",
            prompt.to_lowercase(),
            env_var
        ));
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", prompt.to_lowercase(), e))
}

/// Read a new secret from `env_var`, or prompt for it twice.
pub fn prompt_new_secret(env_var: &str, prompt: &str) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = env_secret(env_var) {
        return Ok(value);
    }
    if !is_interactive() {
        return Err(anyhow::anyhow!(
            "No {} provided and no TTY available. Set {}.",
            prompt.to_lowercase(),
            env_var
        ));
    }
    Password::new()
        .with_prompt(prompt)
        .with_confirmation(format!("Confirm {}", prompt.to_lowercase()), "Entries do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", prompt.to_lowercase(), e))
}

/// Ask a yes/no question; `false` without a terminal.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))
}

/// Read a note or message body from --body, stdin, $EDITOR, or a prompt.
///
/// `existing` pre-fills the editor when changing a note.
pub fn read_body(body: Option<String>, existing: Option<&str>) -> anyhow::Result<String> {
    if let Some(value) = body {
        if value.trim().is_empty() {
            return Err(anyhow::anyhow!("--body cannot be empty"));
        }
        return Ok(value);
    }

    if !is_interactive() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        let trimmed = buffer.trim_end().to_string();
        if trimmed.is_empty() {
            return Err(anyhow::anyhow!("No input provided on stdin"));
        }
        return Ok(trimmed);
    }

    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.trim().is_empty() {
            return read_body_from_editor(&editor, existing.unwrap_or(""));
        }
    }

    let mut input = Input::<String>::new().with_prompt("Body");
    if let Some(text) = existing {
        input = input.with_initial_text(text);
    }
    let value = input
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to read body: {}", e))?;
    if value.trim().is_empty() {
        return Err(anyhow::anyhow!("Body is empty"));
    }
    Ok(value)
}

fn read_body_from_editor(editor: &str, initial: &str) -> anyhow::Result<String> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System time error: {}", e))?
        .as_nanos();
    let filename = format!("stinky_note_{}_{}.md", std::process::id(), nanos);
    let path = std::env::temp_dir().join(filename);

    std::fs::write(&path, initial)
        .map_err(|e| anyhow::anyhow!("Failed to create temp file: {}", e))?;

    let status = Command::new(editor)
        .arg(&path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e));
    let status = match status {
        Ok(status) => status,
        Err(err) => {
            let _ = std::fs::remove_file(&path);
            return Err(err);
        }
    };
    if !status.success() {
        let _ = std::fs::remove_file(&path);
        return Err(anyhow::anyhow!("Editor exited with failure"));
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read temp file: {}", e));
    let _ = std::fs::remove_file(&path);

    let trimmed = contents?.trim_end().to_string();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("Body is empty"));
    }
    Ok(trimmed)
}
