use stinky_core::crypto::cipher::{decrypt, encrypt};
use stinky_core::crypto::{MasterKey, NoteKey};
use stinky_core::DecryptionFailure;

#[test]
fn test_pw1_pw2_scenario() {
    let sealed = encrypt("top secret", "pw1").expect("encrypt should succeed");

    assert_eq!(
        decrypt(&sealed.ciphertext, &sealed.salt, "pw2"),
        Err(DecryptionFailure::InvalidCredentialOrData)
    );
    assert_eq!(
        decrypt(&sealed.ciphertext, &sealed.salt, "pw1").as_deref(),
        Ok("top secret")
    );
}

#[test]
fn test_salt_uniqueness_across_calls() {
    let salts: std::collections::HashSet<_> = (0..8)
        .map(|_| encrypt("same", "same").unwrap().salt)
        .collect();
    assert_eq!(salts.len(), 8);
}

#[test]
fn test_outputs_are_plain_base64_text() {
    let sealed = encrypt("hello", "pw").unwrap();
    let is_base64 = |s: &str| {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
    };
    assert!(is_base64(&sealed.ciphertext));
    assert!(is_base64(&sealed.salt));
}

#[test]
fn test_long_content_round_trip() {
    let text = "lorem ipsum dolor sit amet\n".repeat(2_000);
    let sealed = encrypt(&text, "pw").unwrap();
    assert_eq!(decrypt(&sealed.ciphertext, &sealed.salt, "pw").unwrap(), text);
}

#[test]
fn test_failures_are_recoverable() {
    let sealed = encrypt("retry me", "right").unwrap();

    for attempt in ["wrong", "also wrong", "right"] {
        match decrypt(&sealed.ciphertext, &sealed.salt, attempt) {
            Ok(plaintext) => {
                assert_eq!(attempt, "right");
                assert_eq!(plaintext, "retry me");
            }
            Err(failure) => assert_eq!(failure, DecryptionFailure::InvalidCredentialOrData),
        }
    }
}

#[test]
fn test_note_key_dispatch() {
    let master = MasterKey::new("master-passphrase-123").unwrap();

    let by_master = NoteKey::Master(&master).seal("pro content").unwrap();
    assert!(by_master.salt.is_none());
    assert_eq!(
        NoteKey::Master(&master).open(&by_master.content, None).unwrap(),
        "pro content"
    );

    let by_password = NoteKey::Password("pw").seal("note").unwrap();
    assert_eq!(
        NoteKey::Password("pw")
            .open(&by_password.content, by_password.salt.as_deref())
            .unwrap(),
        "note"
    );
    assert_eq!(
        NoteKey::Master(&master).open(&by_password.content, by_password.salt.as_deref()),
        Err(DecryptionFailure::InvalidCredentialOrData)
    );
}
