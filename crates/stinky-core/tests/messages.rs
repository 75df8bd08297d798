use std::fs;

use stinky_core::storage::{JsonRecordStore, Outgoing};
use stinky_core::{DecryptionFailure, StinkyError};
use tempfile::TempDir;

fn store_with_users() -> (TempDir, JsonRecordStore) {
    let dir = TempDir::new().expect("tempdir should be created");
    let store = JsonRecordStore::new(dir.path());
    store.register_user("alice", "Alice", "hunter2", false).unwrap();
    store.register_user("bob", "Bob", "hunter2", false).unwrap();
    (dir, store)
}

fn plain<'a>(from: &'a str, to: &'a str, content: &'a str) -> Outgoing<'a> {
    Outgoing {
        sender_id: from,
        recipient_id: to,
        subject: "hi",
        content,
        password: None,
    }
}

#[test]
fn test_send_and_read_inbox() {
    let (_dir, store) = store_with_users();
    let messages = store.messages();

    let first = messages.send_message(plain("alice", "bob", "one")).unwrap();
    let second = messages.send_message(plain("alice", "bob", "two")).unwrap();
    messages.send_message(plain("bob", "alice", "reply")).unwrap();

    let inbox = messages.inbox("bob");
    let ids: Vec<_> = inbox.iter().map(|(id, _)| id.clone()).collect();
    assert_eq!(ids, [second, first.clone()]);
    assert_eq!(messages.unread_count("bob"), 2);

    messages.mark_read(&first).unwrap();
    assert_eq!(messages.unread_count("bob"), 1);
    assert_eq!(messages.read_message(&first, None).unwrap(), "one");
}

#[test]
fn test_unknown_recipient_rejected() {
    let (_dir, store) = store_with_users();
    assert!(matches!(
        store.messages().send_message(plain("alice", "mallory", "hey")),
        Err(StinkyError::UserNotFound(_))
    ));
    assert!(!store.messages_path().exists());
}

#[test]
fn test_encrypted_message() {
    let (_dir, store) = store_with_users();
    let messages = store.messages();

    let id = messages
        .send_message(Outgoing {
            password: Some("shared"),
            ..plain("alice", "bob", "meet at noon")
        })
        .unwrap();

    let raw = fs::read_to_string(store.messages_path()).unwrap();
    assert!(!raw.contains("meet at noon"));

    assert!(matches!(
        messages.read_message(&id, Some("guess")),
        Err(StinkyError::Decryption(
            DecryptionFailure::InvalidCredentialOrData
        ))
    ));
    assert!(matches!(
        messages.read_message(&id, None),
        Err(StinkyError::InvalidInput(_))
    ));
    assert_eq!(
        messages.read_message(&id, Some("shared")).unwrap(),
        "meet at noon"
    );
}

#[test]
fn test_messages_are_scoped_to_recipient() {
    let (_dir, store) = store_with_users();
    let messages = store.messages();
    let id = messages.send_message(plain("alice", "bob", "for bob")).unwrap();

    assert!(messages.get_for("bob", &id).is_ok());
    assert!(matches!(
        messages.get_for("alice", &id),
        Err(StinkyError::MessageNotFound(_))
    ));
}

#[test]
fn test_delete_message() {
    let (_dir, store) = store_with_users();
    let messages = store.messages();
    let id = messages.send_message(plain("alice", "bob", "bye")).unwrap();

    messages.delete_message(&id).unwrap();
    assert!(messages.inbox("bob").is_empty());
    assert!(matches!(
        messages.delete_message(&id),
        Err(StinkyError::MessageNotFound(_))
    ));
    assert!(matches!(
        messages.mark_read(&id),
        Err(StinkyError::MessageNotFound(_))
    ));
}

#[test]
fn test_malformed_message_book_reads_empty() {
    let (_dir, store) = store_with_users();
    fs::write(store.messages_path(), "garbage").unwrap();

    let messages = store.messages();
    assert!(messages.inbox("bob").is_empty());
    messages.send_message(plain("alice", "bob", "fresh")).unwrap();
    assert_eq!(messages.inbox("bob").len(), 1);
}

#[test]
fn test_deleted_user_inbox_is_purged() {
    let (_dir, store) = store_with_users();
    let messages = store.messages();
    messages.send_message(plain("alice", "bob", "for bob")).unwrap();
    messages.send_message(plain("bob", "alice", "from bob")).unwrap();

    store.delete_user("bob").unwrap();

    let book = messages.load();
    assert_eq!(book.messages.len(), 1);
    assert!(book.messages.values().all(|m| m.recipient_id != "bob"));
    assert_eq!(messages.inbox("alice").len(), 1);

    // a new account under the same ID starts with an empty inbox
    store.register_user("bob", "Bob", "hunter2", false).unwrap();
    assert!(messages.inbox("bob").is_empty());
}
