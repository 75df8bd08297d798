//! Per-user note statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::UserNoteCollection;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteStats {
    pub total: usize,
    pub private: usize,
    pub public: usize,
    pub encrypted: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    /// Characters across unencrypted notes; ciphertext is not counted
    pub plaintext_chars: usize,
}

impl NoteStats {
    pub fn from_collection(collection: &UserNoteCollection) -> Self {
        let mut stats = NoteStats::default();

        for record in collection.notes.values() {
            stats.total += 1;
            if record.is_private {
                stats.private += 1;
            } else {
                stats.public += 1;
            }
            if record.is_encrypted {
                stats.encrypted += 1;
            } else {
                stats.plaintext_chars += record.content.chars().count();
            }

            stats.oldest = Some(match stats.oldest {
                Some(oldest) => oldest.min(record.created_at),
                None => record.created_at,
            });
            stats.newest = Some(match stats.newest {
                Some(newest) => newest.max(record.created_at),
                None => record.created_at,
            });
        }

        stats
    }
}
