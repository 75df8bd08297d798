//! JSON-file record store.
//!
//! Layout under the data directory:
//!
//! ```text
//! registry.json          user_id -> account
//! users/<user_id>.json   one note collection per user
//! messages.json          shared message book
//! master.check           master passphrase check token (master mode)
//! exports/               text exports
//! ```
//!
//! Every read re-parses the file and every write replaces it whole through a
//! temp file and rename. Nothing is cached between calls.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::crypto::{self, MasterKey, NoteKey};
use crate::error::{Result, StinkyError};
use crate::fs::{write_atomic, write_json_atomic};
use crate::storage::messages::MessageStore;
use crate::storage::traits::RecordStore;
use crate::storage::types::{
    NoteRecord, NoteUpdate, NotesLoad, PublicNote, Registry, UserAccount, UserNoteCollection,
};

const REGISTRY_FILE: &str = "registry.json";
const USERS_DIR: &str = "users";
const MESSAGES_FILE: &str = "messages.json";
const EXPORTS_DIR: &str = "exports";
const MASTER_CHECK_FILE: &str = "master.check";
const MAX_USER_ID_BYTES: usize = 64;

/// Keying policy for the store.
#[derive(Debug, Default)]
pub struct StoreOptions {
    /// Master passphrase, when the master keying mode is configured
    pub master: Option<MasterKey>,
    /// Seal new notes of Pro users with the master key automatically.
    /// Has no effect without `master`.
    pub encrypt_pro_by_default: bool,
}

/// Record store backed by JSON files in one data directory.
#[derive(Debug)]
pub struct JsonRecordStore {
    root: PathBuf,
    options: StoreOptions,
}

/// Check that `user_id` is safe to use as a file name.
///
/// Accepts 1 to 64 bytes of ASCII letters, digits, `-`, `_` and `.`, not
/// starting with `.`.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(StinkyError::InvalidInput(
            "User ID cannot be empty".to_string(),
        ));
    }
    if user_id.len() > MAX_USER_ID_BYTES {
        return Err(StinkyError::InvalidInput(format!(
            "User ID must be at most {} characters",
            MAX_USER_ID_BYTES
        )));
    }
    if user_id.starts_with('.') {
        return Err(StinkyError::InvalidInput(
            "User ID cannot start with '.'".to_string(),
        ));
    }
    if let Some(bad) = user_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(StinkyError::InvalidInput(format!(
            "User ID contains invalid character {:?}",
            bad
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(StinkyError::InvalidInput(
            "Note content cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Read a file to a string; `None` when it does not exist.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StinkyError::io(path, err)),
    }
}

impl JsonRecordStore {
    /// Store rooted at `root` with per-note keying only.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, StoreOptions::default())
    }

    pub fn with_options(root: impl Into<PathBuf>, options: StoreOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    /// Path of a user's note file. Fails for invalid user IDs.
    pub fn user_path(&self, user_id: &str) -> Result<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.root.join(USERS_DIR).join(format!("{}.json", user_id)))
    }

    pub fn messages_path(&self) -> PathBuf {
        self.root.join(MESSAGES_FILE)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join(EXPORTS_DIR)
    }

    pub fn master_key(&self) -> Option<&MasterKey> {
        self.options.master.as_ref()
    }

    pub fn master_check_path(&self) -> PathBuf {
        self.root.join(MASTER_CHECK_FILE)
    }

    /// Confirm `master` is the passphrase this directory is keyed with.
    ///
    /// Compares against `master.check`. Without that file the first
    /// master-keyed note found must open, and the check is then recorded.
    pub fn check_master(&self, master: &MasterKey) -> Result<()> {
        let path = self.master_check_path();
        if let Some(token) = read_optional(&path)? {
            master.verify_check(&token)?;
            debug!("master passphrase accepted");
            return Ok(());
        }

        if let Some(record) = self.first_master_keyed_note() {
            master.decrypt(&record.content)?;
        }
        write_atomic(&path, master.check_token()?.as_bytes())?;
        info!(path = %path.display(), "master passphrase check recorded");
        Ok(())
    }

    fn first_master_keyed_note(&self) -> Option<NoteRecord> {
        self.load_registry()
            .keys()
            .find_map(|user_id| match self.load_notes(user_id) {
                Ok(NotesLoad::Loaded(collection)) => collection
                    .notes
                    .into_values()
                    .find(NoteRecord::is_master_keyed),
                _ => None,
            })
    }

    /// Whether `init` has run here (a registry file exists).
    pub fn is_initialized(&self) -> bool {
        self.registry_path().exists()
    }

    /// Message book sharing this store's directory and registry.
    pub fn messages(&self) -> MessageStore<'_> {
        MessageStore::new(self)
    }

    // --- Accounts ---

    /// Create an account and its empty note store.
    pub fn register_user(
        &self,
        user_id: &str,
        full_name: &str,
        password: &str,
        is_pro: bool,
    ) -> Result<()> {
        validate_user_id(user_id)?;
        crypto::validate_password(password)?;

        let mut registry = self.load_registry();
        if registry.contains_key(user_id) {
            return Err(StinkyError::UserExists(user_id.to_string()));
        }

        registry.insert(
            user_id.to_string(),
            UserAccount {
                full_name: full_name.trim().to_string(),
                password_credential: crypto::hash_credential(password)?,
                is_pro,
            },
        );
        self.save_registry(&registry)?;

        if let Err(err) = self.create_user_store(user_id) {
            registry.remove(user_id);
            if let Err(rollback) = self.save_registry(&registry) {
                warn!(user_id, error = %rollback, "failed to roll back registry entry");
            }
            return Err(err);
        }

        info!(user_id, is_pro, "user registered");
        Ok(())
    }

    /// Check a password and return the account.
    ///
    /// A legacy plaintext credential is replaced by a hash on success.
    pub fn authenticate(&self, user_id: &str, password: &str) -> Result<UserAccount> {
        let mut registry = self.load_registry();
        let account = registry
            .get_mut(user_id)
            .ok_or_else(|| StinkyError::UserNotFound(user_id.to_string()))?;

        if !crypto::verify_credential(&account.password_credential, password) {
            debug!(user_id, "credential mismatch");
            return Err(StinkyError::InvalidCredential(user_id.to_string()));
        }

        if crypto::needs_rehash(&account.password_credential) {
            account.password_credential = crypto::hash_credential(password)?;
            let upgraded = account.clone();
            match self.save_registry(&registry) {
                Ok(()) => info!(user_id, "legacy credential upgraded"),
                Err(err) => warn!(user_id, error = %err, "could not persist upgraded credential"),
            }
            return Ok(upgraded);
        }

        Ok(account.clone())
    }

    pub fn change_password(&self, user_id: &str, current: &str, new: &str) -> Result<()> {
        self.authenticate(user_id, current)?;
        crypto::validate_password(new)?;

        let mut registry = self.load_registry();
        let account = registry
            .get_mut(user_id)
            .ok_or_else(|| StinkyError::UserNotFound(user_id.to_string()))?;
        account.password_credential = crypto::hash_credential(new)?;
        self.save_registry(&registry)?;

        info!(user_id, "password changed");
        Ok(())
    }

    pub fn set_pro(&self, user_id: &str, is_pro: bool) -> Result<()> {
        let mut registry = self.load_registry();
        let account = registry
            .get_mut(user_id)
            .ok_or_else(|| StinkyError::UserNotFound(user_id.to_string()))?;
        account.is_pro = is_pro;
        self.save_registry(&registry)?;

        info!(user_id, is_pro, "pro status updated");
        Ok(())
    }

    /// Flip the Pro flag, returning the new value.
    pub fn toggle_pro(&self, user_id: &str) -> Result<bool> {
        let is_pro = !self.account(user_id)?.is_pro;
        self.set_pro(user_id, is_pro)?;
        Ok(is_pro)
    }

    /// Remove the account, its note file and its inbox.
    ///
    /// The registry entry goes first: once it is gone the user no longer
    /// exists, even if removing the note file then fails.
    pub fn delete_user(&self, user_id: &str) -> Result<()> {
        let mut registry = self.load_registry();
        if registry.remove(user_id).is_none() {
            return Err(StinkyError::UserNotFound(user_id.to_string()));
        }
        self.save_registry(&registry)?;

        if let Err(err) = self.delete_user_store(user_id) {
            warn!(user_id, error = %err, "account removed but note file remains");
            return Err(err);
        }
        self.messages().purge_recipient(user_id)?;

        info!(user_id, "user deleted");
        Ok(())
    }

    /// Look up one account.
    pub fn account(&self, user_id: &str) -> Result<UserAccount> {
        self.load_registry()
            .remove(user_id)
            .ok_or_else(|| StinkyError::UserNotFound(user_id.to_string()))
    }

    fn require_pro(&self, user_id: &str) -> Result<()> {
        if self.account(user_id)?.is_pro {
            Ok(())
        } else {
            Err(StinkyError::ProRequired(format!(
                "{} needs a Pro account to encrypt notes",
                user_id
            )))
        }
    }

    // --- Notes ---

    /// The user's collection, or an error if it is missing or malformed.
    pub fn list_notes(&self, user_id: &str) -> Result<UserNoteCollection> {
        match self.load_notes(user_id)? {
            NotesLoad::Loaded(collection) => Ok(collection),
            NotesLoad::Missing => Err(StinkyError::StoreMissing(user_id.to_string())),
            NotesLoad::Malformed(reason) => Err(StinkyError::StoreMalformed {
                path: self.user_path(user_id)?,
                reason,
            }),
        }
    }

    pub fn get_note(&self, user_id: &str, note_id: &str) -> Result<NoteRecord> {
        self.list_notes(user_id)?
            .notes
            .swap_remove(note_id)
            .ok_or_else(|| StinkyError::NoteNotFound(note_id.to_string()))
    }

    /// Whether reading `record` needs a key from the caller.
    pub fn key_required(&self, record: &NoteRecord) -> bool {
        record.is_encrypted && !(record.is_master_keyed() && self.options.master.is_some())
    }

    /// The plaintext of a note, decrypting if needed.
    ///
    /// Master-keyed notes open with the configured master key when `key` is
    /// `None`.
    pub fn read_note(&self, user_id: &str, note_id: &str, key: Option<NoteKey<'_>>) -> Result<String> {
        let record = self.get_note(user_id, note_id)?;
        if !record.is_encrypted {
            return Ok(record.content);
        }
        let key = self.resolve_key(&record, key)?;
        Ok(key.open(&record.content, record.salt.as_deref())?)
    }

    /// Add a note that is encrypted from the start. Requires Pro.
    pub fn create_encrypted_note(
        &self,
        user_id: &str,
        content: &str,
        is_private: bool,
        key: NoteKey<'_>,
    ) -> Result<String> {
        validate_content(content)?;
        self.require_pro(user_id)?;
        let mut collection = self.list_notes(user_id)?;

        let sealed = key.seal(content)?;
        let mut record = NoteRecord::plaintext(sealed.content, is_private, Utc::now());
        record.is_encrypted = true;
        record.salt = sealed.salt;

        let note_id = Uuid::now_v7().to_string();
        collection.notes.insert(note_id.clone(), record);
        self.save_notes(user_id, &collection)?;

        info!(user_id, note_id = %note_id, "encrypted note created");
        Ok(note_id)
    }

    /// Encrypt a plaintext note in place. Requires Pro.
    pub fn encrypt_note(&self, user_id: &str, note_id: &str, key: NoteKey<'_>) -> Result<()> {
        self.require_pro(user_id)?;
        self.update_note(user_id, note_id, |record| {
            if record.is_encrypted {
                return Err(StinkyError::InvalidInput(format!(
                    "Note {} is already encrypted",
                    note_id
                )));
            }
            let sealed = key.seal(&record.content)?;
            record.content = sealed.content;
            record.salt = sealed.salt;
            record.is_encrypted = true;
            Ok(())
        })?;

        info!(user_id, note_id, "note encrypted");
        Ok(())
    }

    /// Decrypt an encrypted note in place, storing its plaintext.
    pub fn decrypt_note(&self, user_id: &str, note_id: &str, key: Option<NoteKey<'_>>) -> Result<()> {
        self.update_note(user_id, note_id, |record| {
            if !record.is_encrypted {
                return Err(StinkyError::InvalidInput(format!(
                    "Note {} is not encrypted",
                    note_id
                )));
            }
            let key = self.resolve_key(record, key)?;
            record.content = key.open(&record.content, record.salt.as_deref())?;
            record.salt = None;
            record.is_encrypted = false;
            Ok(())
        })?;

        info!(user_id, note_id, "note decrypted");
        Ok(())
    }

    /// Replace the content of an encrypted note, and optionally its privacy.
    ///
    /// The key must open the current content; the new content is sealed
    /// under the same key with a fresh salt.
    pub fn edit_encrypted_note(
        &self,
        user_id: &str,
        note_id: &str,
        content: &str,
        is_private: Option<bool>,
        key: Option<NoteKey<'_>>,
    ) -> Result<()> {
        validate_content(content)?;
        self.update_note(user_id, note_id, |record| {
            if !record.is_encrypted {
                return Err(StinkyError::InvalidInput(format!(
                    "Note {} is not encrypted",
                    note_id
                )));
            }
            let key = self.resolve_key(record, key)?;
            key.open(&record.content, record.salt.as_deref())?;
            let sealed = key.seal(content)?;
            record.content = sealed.content;
            record.salt = sealed.salt;
            if let Some(is_private) = is_private {
                record.is_private = is_private;
            }
            Ok(())
        })?;

        info!(user_id, note_id, "encrypted note edited");
        Ok(())
    }

    fn resolve_key<'a>(&'a self, record: &NoteRecord, key: Option<NoteKey<'a>>) -> Result<NoteKey<'a>> {
        if let Some(key) = key {
            return Ok(key);
        }
        match (&self.options.master, record.is_master_keyed()) {
            (Some(master), true) => Ok(NoteKey::Master(master)),
            (None, true) => Err(StinkyError::InvalidInput(
                "Note is sealed with the master passphrase, which is not configured".to_string(),
            )),
            (_, false) => Err(StinkyError::InvalidInput(
                "Note is encrypted; its password is required".to_string(),
            )),
        }
    }

    /// Load, modify one note, bump `updated_at`, save.
    fn update_note<F>(&self, user_id: &str, note_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut NoteRecord) -> Result<()>,
    {
        let mut collection = self.list_notes(user_id)?;
        let record = collection
            .notes
            .get_mut(note_id)
            .ok_or_else(|| StinkyError::NoteNotFound(note_id.to_string()))?;

        apply(record)?;
        record.updated_at = Utc::now();

        self.save_notes(user_id, &collection)
    }
}

impl RecordStore for JsonRecordStore {
    fn load_registry(&self) -> Registry {
        let path = self.registry_path();
        match read_optional(&path) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(registry) => registry,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "registry is malformed; treating as empty");
                    Registry::new()
                }
            },
            Ok(None) => {
                debug!(path = %path.display(), "no registry yet");
                Registry::new()
            }
            Err(err) => {
                warn!(error = %err, "registry unreadable; treating as empty");
                Registry::new()
            }
        }
    }

    fn save_registry(&self, registry: &Registry) -> Result<()> {
        let path = self.registry_path();
        write_json_atomic(&path, registry)?;
        debug!(path = %path.display(), users = registry.len(), "registry saved");
        Ok(())
    }

    fn create_user_store(&self, user_id: &str) -> Result<()> {
        match self.load_notes(user_id)? {
            NotesLoad::Loaded(_) => {
                debug!(user_id, "note store already exists");
                Ok(())
            }
            NotesLoad::Missing => self.save_notes(user_id, &UserNoteCollection::empty(user_id)),
            NotesLoad::Malformed(reason) => {
                warn!(user_id, reason = %reason, "replacing malformed note store");
                self.save_notes(user_id, &UserNoteCollection::empty(user_id))
            }
        }
    }

    fn delete_user_store(&self, user_id: &str) -> Result<()> {
        let path = self.user_path(user_id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(user_id, "note store removed");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StinkyError::io(path, err)),
        }
    }

    fn load_notes(&self, user_id: &str) -> Result<NotesLoad> {
        let path = self.user_path(user_id)?;
        let Some(text) = read_optional(&path)? else {
            return Ok(NotesLoad::Missing);
        };

        match serde_json::from_str::<UserNoteCollection>(&text) {
            Ok(collection) => Ok(NotesLoad::Loaded(collection)),
            Err(err) => {
                warn!(user_id, error = %err, "note store is malformed");
                Ok(NotesLoad::Malformed(err.to_string()))
            }
        }
    }

    fn save_notes(&self, user_id: &str, collection: &UserNoteCollection) -> Result<()> {
        let path = self.user_path(user_id)?;
        write_json_atomic(&path, collection)?;
        debug!(user_id, notes = collection.notes.len(), "note store saved");
        Ok(())
    }

    fn create_note(&self, user_id: &str, content: &str, is_private: bool) -> Result<String> {
        validate_content(content)?;
        let mut collection = self.list_notes(user_id)?;

        let mut record = NoteRecord::plaintext(content, is_private, Utc::now());

        let is_pro = self
            .load_registry()
            .get(user_id)
            .map(|account| account.is_pro)
            .unwrap_or(false);
        if let (true, true, Some(master)) = (
            is_pro,
            self.options.encrypt_pro_by_default,
            self.options.master.as_ref(),
        ) {
            let sealed = NoteKey::Master(master).seal(content)?;
            record.content = sealed.content;
            record.salt = sealed.salt;
            record.is_encrypted = true;
        }

        let note_id = Uuid::now_v7().to_string();
        let encrypted = record.is_encrypted;
        collection.notes.insert(note_id.clone(), record);
        self.save_notes(user_id, &collection)?;

        info!(user_id, note_id = %note_id, encrypted, "note created");
        Ok(note_id)
    }

    fn edit_note(&self, user_id: &str, note_id: &str, update: &NoteUpdate) -> Result<()> {
        if update.is_empty() {
            return Err(StinkyError::InvalidInput(
                "Nothing to update".to_string(),
            ));
        }
        if let Some(content) = &update.content {
            validate_content(content)?;
        }

        self.update_note(user_id, note_id, |record| {
            if let Some(content) = &update.content {
                if record.is_encrypted {
                    let master = match (&self.options.master, record.is_master_keyed()) {
                        (Some(master), true) => master,
                        _ => {
                            return Err(StinkyError::InvalidInput(format!(
                                "Note {} is encrypted; edit it with its password",
                                note_id
                            )))
                        }
                    };
                    record.content = NoteKey::Master(master).seal(content)?.content;
                } else {
                    record.content = content.clone();
                }
            }
            if let Some(is_private) = update.is_private {
                record.is_private = is_private;
            }
            Ok(())
        })?;

        debug!(user_id, note_id, "note edited");
        Ok(())
    }

    fn delete_note(&self, user_id: &str, note_id: &str) -> Result<()> {
        let mut collection = self.list_notes(user_id)?;
        if collection.notes.shift_remove(note_id).is_none() {
            return Err(StinkyError::NoteNotFound(note_id.to_string()));
        }
        self.save_notes(user_id, &collection)?;

        info!(user_id, note_id, "note deleted");
        Ok(())
    }

    fn list_public_notes_all_users(&self, registry: &Registry) -> Vec<PublicNote> {
        let mut public = Vec::new();
        for user_id in registry.keys() {
            let collection = match self.load_notes(user_id) {
                Ok(NotesLoad::Loaded(collection)) => collection,
                Ok(NotesLoad::Missing) => {
                    debug!(user_id = %user_id, "no note store; skipping");
                    continue;
                }
                Ok(NotesLoad::Malformed(_)) => continue,
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "cannot read note store; skipping");
                    continue;
                }
            };

            public.extend(
                collection
                    .notes
                    .into_iter()
                    .filter(|(_, record)| !record.is_private)
                    .map(|(note_id, record)| PublicNote {
                        user_id: user_id.clone(),
                        note_id,
                        record,
                    }),
            );
        }
        public
    }
}
