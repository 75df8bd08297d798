//! Storage for Stinky.
//!
//! The `RecordStore` trait is the contract for the user registry and the
//! per-user note files. `JsonRecordStore` implements it with one JSON file per
//! concern in a single data directory, and also owns account management and
//! note encryption toggles. The shared message book lives next to it.
//!
//! ## Durability
//!
//! Each write replaces the whole file through a temp file and rename. There
//! is no locking: concurrent writers to the same file lose updates.

pub mod json_store;
pub mod messages;
pub mod traits;
pub mod types;

// Re-export public types
pub use json_store::{validate_user_id, JsonRecordStore, StoreOptions};
pub use messages::{Message, MessageBook, MessageStore, Outgoing};
pub use traits::RecordStore;
pub use types::{
    NoteRecord, NoteUpdate, NotesLoad, PublicNote, Registry, UserAccount, UserNoteCollection,
};
