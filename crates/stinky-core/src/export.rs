//! Plain-text export of a user's notes.
//!
//! Encrypted notes are never written out in plaintext; their block shows a
//! placeholder instead of the content.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Result;
use crate::fs::write_atomic;
use crate::storage::UserNoteCollection;

/// Placeholder written in place of encrypted content.
pub const ENCRYPTED_PLACEHOLDER: &str = "[ENCRYPTED NOTE]";

const RULE: &str = "==================================================";
const SEPARATOR: &str = "--------------------------------------------------";

/// Render the export document.
pub fn export_notes_text(user_id: &str, collection: &UserNoteCollection, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Notes export for {}", user_id);
    let _ = writeln!(out, "Exported: {}", now.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Total notes: {}", collection.notes.len());
    let _ = writeln!(out, "{}", RULE);

    for (note_id, record) in &collection.notes {
        let _ = writeln!(out);
        let _ = writeln!(out, "Note ID: {}", note_id);
        let _ = writeln!(
            out,
            "Privacy: {}",
            if record.is_private { "private" } else { "public" }
        );
        let _ = writeln!(out, "Created: {}", record.created_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "Updated: {}", record.updated_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out);
        if record.is_encrypted {
            let _ = writeln!(out, "{}", ENCRYPTED_PLACEHOLDER);
        } else {
            let _ = writeln!(out, "{}", record.content);
        }
        let _ = writeln!(out, "{}", SEPARATOR);
    }

    out
}

/// File name for an export taken at `now`.
pub fn export_file_name(user_id: &str, now: DateTime<Utc>) -> String {
    format!("{}_notes_{}.txt", user_id, now.format("%Y%m%d_%H%M%S"))
}

/// Write the export into `dir` and return the file path.
pub fn write_export(
    dir: &Path,
    user_id: &str,
    collection: &UserNoteCollection,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let path = dir.join(export_file_name(user_id, now));
    write_atomic(&path, export_notes_text(user_id, collection, now).as_bytes())?;
    info!(user_id, path = %path.display(), "notes exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NoteRecord;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            export_file_name("alice", fixed_now()),
            "alice_notes_20240506_070809.txt"
        );
    }

    #[test]
    fn test_encrypted_content_is_not_exported() {
        let now = fixed_now();
        let mut collection = UserNoteCollection::empty("alice");
        collection
            .notes
            .insert("n1".into(), NoteRecord::plaintext("grocery list", false, now));
        let mut sealed = NoteRecord::plaintext("U0VBTEVE", true, now);
        sealed.is_encrypted = true;
        sealed.salt = Some("c2FsdA==".into());
        collection.notes.insert("n2".into(), sealed);

        let text = export_notes_text("alice", &collection, now);
        assert!(text.contains("Notes export for alice"));
        assert!(text.contains("Total notes: 2"));
        assert!(text.contains("grocery list"));
        assert!(text.contains(ENCRYPTED_PLACEHOLDER));
        assert!(!text.contains("U0VBTEVE"));
        assert!(text.contains("Privacy: private"));
    }

    #[test]
    fn test_write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let now = fixed_now();
        let collection = UserNoteCollection::empty("alice");

        let path = write_export(&dir.path().join("exports"), "alice", &collection, now).unwrap();
        assert!(path.ends_with("alice_notes_20240506_070809.txt"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("Total notes: 0"));
    }
}
