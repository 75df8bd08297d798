use stinky_core::RecordStore;

use crate::app::AppContext;
use crate::output::{print_json, print_public_notes, public_note_json};

/// Public notes from every user; no login needed.
pub fn handle_public(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.store()?;
    let registry = store.load_registry();
    let notes = store.list_public_notes_all_users(&registry);

    if ctx.ui().mode.is_json() {
        let values: Vec<_> = notes.iter().map(public_note_json).collect();
        return print_json(&serde_json::Value::Array(values));
    }
    print_public_notes(ctx.ui(), &notes);
    Ok(())
}
