//! Record types persisted by the store.
//!
//! Field names match the on-disk JSON. Aliases accept files written by older
//! versions of the program (`password`, `pro_user`, `note_content`, ...).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Registry: every account keyed by its case-sensitive `user_id`.
pub type Registry = BTreeMap<String, UserAccount>;

/// One account in the shared registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Display name
    #[serde(default, alias = "name")]
    pub full_name: String,

    /// Argon2id PHC string (legacy files may hold plaintext)
    #[serde(alias = "password")]
    pub password_credential: String,

    /// Unlocks encrypted note creation
    #[serde(default, alias = "pro_user")]
    pub is_pro: bool,
}

/// One note: content plus privacy and encryption metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Literal text, or a base64 token when `is_encrypted`
    #[serde(alias = "note_content")]
    pub content: String,

    /// Hidden from the all-users public view
    #[serde(default, alias = "note_private")]
    pub is_private: bool,

    /// Content must pass through the note cipher to be read
    #[serde(default)]
    pub is_encrypted: bool,

    /// Base64 salt for password-keyed notes; `None` for plaintext and
    /// master-keyed notes
    #[serde(default)]
    pub salt: Option<String>,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl NoteRecord {
    /// A plaintext note stamped with `now` for both timestamps.
    pub fn plaintext(content: impl Into<String>, is_private: bool, now: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            is_private,
            is_encrypted: false,
            salt: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this note was sealed with the master passphrase.
    pub fn is_master_keyed(&self) -> bool {
        self.is_encrypted && self.salt.is_none()
    }
}

/// A user's whole note file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNoteCollection {
    pub user_id: String,

    /// Notes keyed by ID, in file order. New notes are appended.
    #[serde(default)]
    pub notes: IndexMap<String, NoteRecord>,
}

impl UserNoteCollection {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            notes: IndexMap::new(),
        }
    }
}

/// Outcome of reading a per-user note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesLoad {
    /// File read and parsed
    Loaded(UserNoteCollection),
    /// No file: the user has no store (distinct from zero notes)
    Missing,
    /// File present but not a valid note collection
    Malformed(String),
}

/// Partial update applied by `edit_note`; omitted fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub content: Option<String>,
    pub is_private: Option<bool>,
}

impl NoteUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn privacy(mut self, is_private: bool) -> Self {
        self.is_private = Some(is_private);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.is_private.is_none()
    }
}

/// A public note found by the all-users scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicNote {
    pub user_id: String,
    pub note_id: String,
    pub record: NoteRecord,
}

/// ISO-8601 timestamps. Writes RFC 3339 in UTC; reads RFC 3339 or the
/// offset-less `YYYY-MM-DDTHH:MM:SS[.ffffff]` form older files used, taken
/// as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
