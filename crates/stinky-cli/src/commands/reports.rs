//! Per-user statistics and text export.

use std::path::PathBuf;

use chrono::Utc;

use stinky_core::export::write_export;
use stinky_core::NoteStats;

use crate::app::{login, AppContext};
use crate::output::{print_json, print_stats, stats_json};
use crate::ui::{print, receipt};

pub fn handle_stats(ctx: &AppContext, user: &str) -> anyhow::Result<()> {
    login(ctx, user)?;
    let store = ctx.store()?;
    let stats = NoteStats::from_collection(&store.list_notes(user)?);
    let unread = store.messages().unread_count(user);

    if ctx.ui().mode.is_json() {
        return print_json(&stats_json(user, &stats, unread));
    }
    print_stats(ctx.ui(), user, &stats, unread);
    Ok(())
}

/// Write every note of `user` to a text file. Encrypted notes appear as a
/// placeholder.
pub fn handle_export(ctx: &AppContext, user: &str, out: Option<&str>) -> anyhow::Result<()> {
    login(ctx, user)?;
    let store = ctx.store()?;
    let collection = store.list_notes(user)?;
    let dir = match out {
        Some(dir) => PathBuf::from(dir),
        None => store.exports_dir(),
    };
    let path = write_export(&dir, user, &collection, Utc::now())?;

    if ctx.ui().mode.is_json() {
        return print_json(&serde_json::json!({
            "user_id": user,
            "path": path,
            "notes": collection.notes.len(),
        }));
    }
    if !ctx.quiet() {
        let ui = ctx.ui();
        let path_display = path.display().to_string();
        let count = collection.notes.len().to_string();
        let items = [("File", path_display.as_str()), ("Notes", count.as_str())];
        print(ui, &receipt(ui, "Notes exported", &items));
    }
    Ok(())
}
