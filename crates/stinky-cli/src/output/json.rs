//! JSON output formatting for notes, accounts and messages.

use stinky_core::storage::{Message, NoteRecord, PublicNote, UserAccount};
use stinky_core::NoteStats;

/// Convert a note to JSON for output.
///
/// Encrypted content is never printed; `plaintext` carries it once opened.
pub fn note_json(note_id: &str, record: &NoteRecord, plaintext: Option<&str>) -> serde_json::Value {
    let content = match plaintext {
        Some(text) => Some(text),
        None if !record.is_encrypted => Some(record.content.as_str()),
        None => None,
    };
    serde_json::json!({
        "id": note_id,
        "content": content,
        "is_private": record.is_private,
        "is_encrypted": record.is_encrypted,
        "created_at": record.created_at,
        "updated_at": record.updated_at,
    })
}

pub fn public_note_json(note: &PublicNote) -> serde_json::Value {
    let mut value = note_json(&note.note_id, &note.record, None);
    value["user_id"] = serde_json::Value::from(note.user_id.as_str());
    value
}

/// Account details; the stored credential is left out.
pub fn account_json(user_id: &str, account: &UserAccount) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "full_name": account.full_name,
        "is_pro": account.is_pro,
    })
}

pub fn message_json(message_id: &str, message: &Message, plaintext: Option<&str>) -> serde_json::Value {
    let content = match plaintext {
        Some(text) => Some(text),
        None if !message.is_encrypted => Some(message.content.as_str()),
        None => None,
    };
    serde_json::json!({
        "id": message_id,
        "from": message.sender_id,
        "to": message.recipient_id,
        "subject": message.subject,
        "content": content,
        "timestamp": message.timestamp,
        "read": message.read,
        "is_encrypted": message.is_encrypted,
    })
}

pub fn stats_json(user_id: &str, stats: &NoteStats, unread_messages: usize) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "notes": stats,
        "unread_messages": unread_messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_encrypted_note_hides_token() {
        let mut record = NoteRecord::plaintext("c2VhbGVk", true, Utc::now());
        record.is_encrypted = true;
        record.salt = Some("c2FsdA==".into());

        let value = note_json("n1", &record, None);
        assert!(value["content"].is_null());
        assert_eq!(value["is_encrypted"], true);

        let opened = note_json("n1", &record, Some("hello"));
        assert_eq!(opened["content"], "hello");
    }

    #[test]
    fn test_account_json_omits_credential() {
        let account = UserAccount {
            full_name: "Alice".into(),
            password_credential: "$argon2id$secret".into(),
            is_pro: true,
        };
        let value = account_json("alice", &account);
        assert!(value.get("password_credential").is_none());
        assert_eq!(value["is_pro"], true);
    }

    #[test]
    fn test_public_note_json_carries_author() {
        let note = PublicNote {
            user_id: "bob".into(),
            note_id: "n2".into(),
            record: NoteRecord::plaintext("hi", false, Utc::now()),
        };
        let value = public_note_json(&note);
        assert_eq!(value["user_id"], "bob");
        assert_eq!(value["content"], "hi");
    }
}
