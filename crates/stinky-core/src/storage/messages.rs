//! Shared message book (`messages.json`).
//!
//! Messages travel between registered users. Content may be sealed with a
//! password through the note cipher; the salt sits next to it the same way it
//! does for notes.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::crypto::cipher;
use crate::error::{Result, StinkyError};
use crate::fs::write_json_atomic;
use crate::storage::json_store::{read_optional, JsonRecordStore};
use crate::storage::traits::RecordStore;
use crate::storage::types::timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender_id: String,
    pub recipient_id: String,
    #[serde(default)]
    pub subject: String,
    pub content: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub is_encrypted: bool,
    #[serde(default)]
    pub salt: Option<String>,
}

/// On-disk shape of `messages.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBook {
    #[serde(default)]
    pub messages: IndexMap<String, Message>,
}

/// Outgoing message fields.
#[derive(Debug, Clone, Copy)]
pub struct Outgoing<'a> {
    pub sender_id: &'a str,
    pub recipient_id: &'a str,
    pub subject: &'a str,
    pub content: &'a str,
    /// Seal the content with this password
    pub password: Option<&'a str>,
}

/// Message operations over a record store's data directory.
pub struct MessageStore<'a> {
    store: &'a JsonRecordStore,
}

impl<'a> MessageStore<'a> {
    pub(crate) fn new(store: &'a JsonRecordStore) -> Self {
        Self { store }
    }

    /// Read the message book. Missing or malformed files read as empty.
    pub fn load(&self) -> MessageBook {
        let path = self.store.messages_path();
        match read_optional(&path) {
            Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_else(|err| {
                warn!(error = %err, "message book is malformed; treating as empty");
                MessageBook::default()
            }),
            Ok(None) => MessageBook::default(),
            Err(err) => {
                warn!(error = %err, "message book unreadable; treating as empty");
                MessageBook::default()
            }
        }
    }

    pub fn save(&self, book: &MessageBook) -> Result<()> {
        write_json_atomic(&self.store.messages_path(), book)?;
        debug!(messages = book.messages.len(), "message book saved");
        Ok(())
    }

    /// Deliver a message; returns its ID.
    pub fn send_message(&self, outgoing: Outgoing<'_>) -> Result<String> {
        let registry = self.store.load_registry();
        for user_id in [outgoing.sender_id, outgoing.recipient_id] {
            if !registry.contains_key(user_id) {
                return Err(StinkyError::UserNotFound(user_id.to_string()));
            }
        }
        if outgoing.content.trim().is_empty() {
            return Err(StinkyError::InvalidInput(
                "Message content cannot be empty".to_string(),
            ));
        }

        let (content, salt) = match outgoing.password {
            Some(password) => {
                let sealed = cipher::encrypt(outgoing.content, password)?;
                (sealed.ciphertext, Some(sealed.salt))
            }
            None => (outgoing.content.to_string(), None),
        };

        let message_id = Uuid::now_v7().to_string();
        let mut book = self.load();
        book.messages.insert(
            message_id.clone(),
            Message {
                sender_id: outgoing.sender_id.to_string(),
                recipient_id: outgoing.recipient_id.to_string(),
                subject: outgoing.subject.trim().to_string(),
                content,
                timestamp: Utc::now(),
                read: false,
                is_encrypted: salt.is_some(),
                salt,
            },
        );
        self.save(&book)?;

        info!(
            from = outgoing.sender_id,
            to = outgoing.recipient_id,
            message_id = %message_id,
            "message sent"
        );
        Ok(message_id)
    }

    /// Messages addressed to `user_id`, newest first.
    pub fn inbox(&self, user_id: &str) -> Vec<(String, Message)> {
        let mut inbox: Vec<_> = self
            .load()
            .messages
            .into_iter()
            .filter(|(_, message)| message.recipient_id == user_id)
            .collect();
        inbox.sort_by(|(a_id, a), (b_id, b)| {
            b.timestamp.cmp(&a.timestamp).then_with(|| b_id.cmp(a_id))
        });
        inbox
    }

    pub fn unread_count(&self, user_id: &str) -> usize {
        self.load()
            .messages
            .values()
            .filter(|message| message.recipient_id == user_id && !message.read)
            .count()
    }

    /// A message addressed to `user_id`.
    ///
    /// Messages for other recipients are reported as not found.
    pub fn get_for(&self, user_id: &str, message_id: &str) -> Result<Message> {
        self.load()
            .messages
            .swap_remove(message_id)
            .filter(|message| message.recipient_id == user_id)
            .ok_or_else(|| StinkyError::MessageNotFound(message_id.to_string()))
    }

    pub fn mark_read(&self, message_id: &str) -> Result<()> {
        let mut book = self.load();
        let message = book
            .messages
            .get_mut(message_id)
            .ok_or_else(|| StinkyError::MessageNotFound(message_id.to_string()))?;
        if message.read {
            return Ok(());
        }
        message.read = true;
        self.save(&book)
    }

    pub fn delete_message(&self, message_id: &str) -> Result<()> {
        let mut book = self.load();
        if book.messages.shift_remove(message_id).is_none() {
            return Err(StinkyError::MessageNotFound(message_id.to_string()));
        }
        self.save(&book)?;

        info!(message_id, "message deleted");
        Ok(())
    }

    /// Drop every message addressed to `user_id`. Returns how many went.
    pub fn purge_recipient(&self, user_id: &str) -> Result<usize> {
        let mut book = self.load();
        let before = book.messages.len();
        book.messages.retain(|_, message| message.recipient_id != user_id);
        let purged = before - book.messages.len();
        if purged > 0 {
            self.save(&book)?;
            debug!(user_id, purged, "purged inbox");
        }
        Ok(purged)
    }

    /// Plaintext content, decrypting with `password` when sealed.
    pub fn read_message(&self, message_id: &str, password: Option<&str>) -> Result<String> {
        let message = self
            .load()
            .messages
            .swap_remove(message_id)
            .ok_or_else(|| StinkyError::MessageNotFound(message_id.to_string()))?;
        open_message(&message, password)
    }
}

/// Decrypt a loaded message, or return its content as-is when not sealed.
pub fn open_message(message: &Message, password: Option<&str>) -> Result<String> {
    if !message.is_encrypted {
        return Ok(message.content.clone());
    }
    let password = password.ok_or_else(|| {
        StinkyError::InvalidInput("Message is encrypted; its password is required".to_string())
    })?;
    let salt = message
        .salt
        .as_deref()
        .ok_or(crate::error::DecryptionFailure::MalformedInput)?;
    Ok(cipher::decrypt(&message.content, salt, password)?)
}
