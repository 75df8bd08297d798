//! Record store trait definition.
//!
//! The `RecordStore` trait is the persistence contract behind every note
//! command: one shared user registry plus one note collection per user.

use super::types::{NoteUpdate, NotesLoad, PublicNote, Registry, UserNoteCollection};
use crate::error::Result;

/// Persistence interface for the user registry and per-user note files.
///
/// Implementations must ensure:
/// - Every write replaces a file atomically (readers never see a torn file)
/// - A missing note file is reported differently from an empty one
/// - Reads never fail on malformed files; they report them
///
/// Writers are not coordinated with one another. Two processes doing
/// read-modify-write on the same file lose one update (last writer wins).
pub trait RecordStore {
    /// Read the registry.
    ///
    /// A missing or unparseable registry yields an empty map.
    fn load_registry(&self) -> Registry;

    /// Persist the whole registry, replacing the file.
    fn save_registry(&self, registry: &Registry) -> Result<()>;

    /// Ensure a note file exists for `user_id`.
    ///
    /// Idempotent: an existing valid file is left untouched.
    fn create_user_store(&self, user_id: &str) -> Result<()>;

    /// Remove the note file for `user_id`. Absence is not an error.
    fn delete_user_store(&self, user_id: &str) -> Result<()>;

    /// Read a user's note collection.
    ///
    /// # Errors
    ///
    /// Only invalid user IDs and I/O failures other than "file not found"
    /// are errors; missing and malformed files come back as [`NotesLoad`]
    /// variants.
    fn load_notes(&self, user_id: &str) -> Result<NotesLoad>;

    /// Persist the whole collection, replacing the file.
    fn save_notes(&self, user_id: &str, collection: &UserNoteCollection) -> Result<()>;

    /// Add a note and return its new ID.
    ///
    /// Both timestamps are set to now.
    ///
    /// # Errors
    ///
    /// Returns `StinkyError::StoreMissing` or `StinkyError::StoreMalformed`
    /// if the collection cannot be loaded; nothing is written in that case.
    fn create_note(&self, user_id: &str, content: &str, is_private: bool) -> Result<String>;

    /// Apply `update` to a note and refresh `updated_at`.
    ///
    /// Fields absent from `update` are left unchanged. `created_at` never
    /// changes.
    fn edit_note(&self, user_id: &str, note_id: &str, update: &NoteUpdate) -> Result<()>;

    /// Remove a note from the collection.
    fn delete_note(&self, user_id: &str, note_id: &str) -> Result<()>;

    /// Every non-private note across all users in `registry`.
    ///
    /// Users whose store is missing or malformed are skipped.
    fn list_public_notes_all_users(&self, registry: &Registry) -> Vec<PublicNote>;
}
