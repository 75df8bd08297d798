use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

const ALICE_PASSWORD: &str = "alice-pass-123";
const BOB_PASSWORD: &str = "bob-pass-456";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stinky"))
}

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("config.toml")
    }

    /// A command with isolated paths and no inherited secrets.
    fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(bin());
        cmd.args(args)
            .env("STINKY_DATA_DIR", self.data_dir())
            .env("STINKY_CONFIG", self.config_path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg-config"))
            .env("XDG_DATA_HOME", self.dir.path().join("xdg-data"))
            .env("NO_COLOR", "1")
            .env_remove("STINKY_PASSWORD")
            .env_remove("STINKY_NEW_PASSWORD")
            .env_remove("STINKY_NOTE_PASSWORD")
            .env_remove("STINKY_MASTER_PASSPHRASE")
            .env_remove("STINKY_LOG")
            .env_remove("EDITOR")
            .stdin(Stdio::null());
        cmd
    }

    fn run(&self, args: &[&str], password: Option<&str>) -> Output {
        let mut cmd = self.cmd(args);
        if let Some(password) = password {
            cmd.env("STINKY_PASSWORD", password);
        }
        cmd.output().expect("run stinky")
    }

    fn run_with_note_password(&self, args: &[&str], password: &str, note_password: &str) -> Output {
        self.cmd(args)
            .env("STINKY_PASSWORD", password)
            .env("STINKY_NOTE_PASSWORD", note_password)
            .output()
            .expect("run stinky")
    }

    fn run_with_master(&self, args: &[&str], password: Option<&str>, master: &str) -> Output {
        let mut cmd = self.cmd(args);
        if let Some(password) = password {
            cmd.env("STINKY_PASSWORD", password);
        }
        cmd.env("STINKY_MASTER_PASSPHRASE", master)
            .output()
            .expect("run stinky")
    }

    fn init(&self) {
        let output = self.run(&["init"], None);
        assert_success(&output);
    }

    fn add_user(&self, user: &str, name: &str, password: &str, pro: bool) {
        let mut args = vec!["user", "add", user, "--name", name];
        if pro {
            args.push("--pro");
        }
        let output = self.run(&args, Some(password));
        assert_success(&output);
    }

    /// Add a note and return its ID.
    fn add_note(&self, user: &str, password: &str, extra: &[&str]) -> String {
        let mut args = vec!["--json", "note", "add", user];
        args.extend_from_slice(extra);
        let output = self.run(&args, Some(password));
        assert_success(&output);
        json(&output)["id"]
            .as_str()
            .expect("note id in output")
            .to_string()
    }
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed ({:?})\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_init_creates_registry_and_config() {
    let sandbox = Sandbox::new();
    sandbox.init();

    assert!(sandbox.data_dir().join("registry.json").exists());
    let config = std::fs::read_to_string(sandbox.config_path()).expect("config written");
    assert!(config.contains("default_privacy = \"private\""));

    let again = sandbox.run(&["init"], None);
    assert_eq!(again.status.code(), Some(4));

    let forced = sandbox.run(&["init", "--force"], None);
    assert_success(&forced);
}

#[test]
fn test_commands_require_init() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["user", "list"], None);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("stinky init"));
}

#[test]
fn test_encrypt_flag_needs_master_mode() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["init", "--encrypt-pro-by-default"], None);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_note_privacy_and_public_listing() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, false);
    sandbox.add_user("bob", "Bob", BOB_PASSWORD, false);

    let hello = sandbox.add_note("alice", ALICE_PASSWORD, &["--body", "hello", "--public"]);
    sandbox.add_note("alice", ALICE_PASSWORD, &["--body", "secret"]);
    sandbox.add_note("bob", BOB_PASSWORD, &["--body", "bob's public", "--public"]);

    let public = json(&sandbox.run(&["--json", "public"], None));
    let public = public.as_array().expect("array");
    assert_eq!(public.len(), 2);
    assert_eq!(public[0]["user_id"], "alice");
    assert_eq!(public[0]["id"], hello.as_str());
    assert_eq!(public[0]["content"], "hello");
    assert_eq!(public[1]["user_id"], "bob");

    let listed = json(&sandbox.run(&["--json", "note", "list", "alice"], Some(ALICE_PASSWORD)));
    let listed = listed.as_array().expect("array");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["content"], "hello");
    assert_eq!(listed[1]["content"], "secret");
    assert_eq!(listed[1]["is_private"], true);
}

#[test]
fn test_edit_and_delete_by_prefix() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, false);
    let note_id = sandbox.add_note("alice", ALICE_PASSWORD, &["--body", "draft"]);

    let edited = sandbox.run(
        &["note", "edit", "alice", &note_id, "--body", "final", "--public"],
        Some(ALICE_PASSWORD),
    );
    assert_success(&edited);

    let shown = json(&sandbox.run(
        &["--json", "note", "show", "alice", &note_id],
        Some(ALICE_PASSWORD),
    ));
    assert_eq!(shown["content"], "final");
    assert_eq!(shown["is_private"], false);

    let privacy_only = sandbox.run(
        &["note", "edit", "alice", &note_id, "--private"],
        Some(ALICE_PASSWORD),
    );
    assert_success(&privacy_only);
    let shown = json(&sandbox.run(
        &["--json", "note", "show", "alice", &note_id],
        Some(ALICE_PASSWORD),
    ));
    assert_eq!(shown["content"], "final");
    assert_eq!(shown["is_private"], true);

    let deleted = sandbox.run(&["note", "delete", "alice", &note_id], Some(ALICE_PASSWORD));
    assert_success(&deleted);

    let missing = sandbox.run(&["note", "show", "alice", &note_id], Some(ALICE_PASSWORD));
    assert_eq!(missing.status.code(), Some(3));
}

#[test]
fn test_encrypted_note_round_trip() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, true);

    let output = sandbox.run_with_note_password(
        &["--json", "note", "add", "alice", "--body", "my secret", "--encrypt"],
        ALICE_PASSWORD,
        "pw1",
    );
    assert_success(&output);
    let added = json(&output);
    let note_id = added["id"].as_str().expect("id").to_string();
    assert_eq!(added["is_encrypted"], true);
    assert!(added["content"].is_null());

    // The file never holds the plaintext.
    let raw = std::fs::read_to_string(sandbox.data_dir().join("users").join("alice.json"))
        .expect("note file");
    assert!(!raw.contains("my secret"));

    let wrong = sandbox.run_with_note_password(
        &["note", "show", "alice", &note_id],
        ALICE_PASSWORD,
        "pw2",
    );
    assert_eq!(wrong.status.code(), Some(5));

    let right = sandbox.run_with_note_password(
        &["--json", "note", "show", "alice", &note_id],
        ALICE_PASSWORD,
        "pw1",
    );
    assert_success(&right);
    assert_eq!(json(&right)["content"], "my secret");

    let decrypted = sandbox.run_with_note_password(
        &["note", "decrypt", "alice", &note_id],
        ALICE_PASSWORD,
        "pw1",
    );
    assert_success(&decrypted);
    let raw = std::fs::read_to_string(sandbox.data_dir().join("users").join("alice.json"))
        .expect("note file");
    assert!(raw.contains("my secret"));
}

#[test]
fn test_master_mode_rejects_wrong_passphrase() {
    let sandbox = Sandbox::new();
    let init = sandbox.run_with_master(
        &["init", "--cipher", "master", "--encrypt-pro-by-default"],
        None,
        "master-pass-123",
    );
    assert_success(&init);
    assert!(sandbox.data_dir().join("master.check").exists());
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, true);

    let added = sandbox.run_with_master(
        &["--json", "note", "add", "alice", "--body", "pro secret"],
        Some(ALICE_PASSWORD),
        "master-pass-123",
    );
    assert_success(&added);
    let note_id = json(&added)["id"].as_str().expect("id").to_string();

    // A typo is refused before anything gets sealed with it.
    let typo = sandbox.run_with_master(
        &["note", "add", "alice", "--body", "sealed with a typo"],
        Some(ALICE_PASSWORD),
        "master-pass-12",
    );
    assert_eq!(typo.status.code(), Some(5));
    let listed = json(&sandbox.run(&["--json", "note", "list", "alice"], Some(ALICE_PASSWORD)));
    assert_eq!(listed.as_array().expect("array").len(), 1);

    let wrong = sandbox.run_with_master(
        &["note", "show", "alice", &note_id],
        Some(ALICE_PASSWORD),
        "master-pass-12",
    );
    assert_eq!(wrong.status.code(), Some(5));

    let right = sandbox.run_with_master(
        &["--json", "note", "show", "alice", &note_id],
        Some(ALICE_PASSWORD),
        "master-pass-123",
    );
    assert_success(&right);
    assert_eq!(json(&right)["content"], "pro secret");

    // Re-running init must confirm the passphrase already in use.
    let reinit = sandbox.run_with_master(
        &["init", "--cipher", "master", "--force"],
        None,
        "another-pass-456",
    );
    assert_eq!(reinit.status.code(), Some(5));
}

#[test]
fn test_encrypted_edit_with_privacy_flag() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, true);
    let output = sandbox.run_with_note_password(
        &["--json", "note", "add", "alice", "--body", "v1", "--encrypt", "--private"],
        ALICE_PASSWORD,
        "pw1",
    );
    assert_success(&output);
    let note_id = json(&output)["id"].as_str().expect("id").to_string();

    let wrong = sandbox.run_with_note_password(
        &["note", "edit", "alice", &note_id, "--body", "v2", "--public"],
        ALICE_PASSWORD,
        "pw2",
    );
    assert_eq!(wrong.status.code(), Some(5));
    let public = json(&sandbox.run(&["--json", "public"], None));
    assert!(public.as_array().expect("array").is_empty());

    let edited = sandbox.run_with_note_password(
        &["note", "edit", "alice", &note_id, "--body", "v2", "--public"],
        ALICE_PASSWORD,
        "pw1",
    );
    assert_success(&edited);
    let shown = json(&sandbox.run_with_note_password(
        &["--json", "note", "show", "alice", &note_id],
        ALICE_PASSWORD,
        "pw1",
    ));
    assert_eq!(shown["content"], "v2");
    assert_eq!(shown["is_private"], false);
}

#[test]
fn test_encryption_requires_pro() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("bob", "Bob", BOB_PASSWORD, false);

    let output = sandbox.run_with_note_password(
        &["note", "add", "bob", "--body", "nope", "--encrypt"],
        BOB_PASSWORD,
        "pw1",
    );
    assert_eq!(output.status.code(), Some(4));

    let promoted = sandbox.run(&["user", "pro", "bob"], Some(BOB_PASSWORD));
    assert_success(&promoted);

    let output = sandbox.run_with_note_password(
        &["note", "add", "bob", "--body", "now allowed", "--encrypt"],
        BOB_PASSWORD,
        "pw1",
    );
    assert_success(&output);
}

#[test]
fn test_auth_failures_and_unknown_users() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, false);

    let wrong = sandbox.run(&["note", "list", "alice"], Some("not-the-password"));
    assert_eq!(wrong.status.code(), Some(5));

    let unknown = sandbox.run(&["note", "list", "mallory"], Some(ALICE_PASSWORD));
    assert_eq!(unknown.status.code(), Some(3));

    let duplicate = sandbox.run(
        &["user", "add", "alice", "--name", "Again"],
        Some(ALICE_PASSWORD),
    );
    assert_eq!(duplicate.status.code(), Some(4));
}

#[test]
fn test_stats_and_export() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, true);
    sandbox.add_note("alice", ALICE_PASSWORD, &["--body", "first", "--public"]);
    let output = sandbox.run_with_note_password(
        &["note", "add", "alice", "--body", "hidden", "--encrypt"],
        ALICE_PASSWORD,
        "pw1",
    );
    assert_success(&output);

    let stats = json(&sandbox.run(&["--json", "stats", "alice"], Some(ALICE_PASSWORD)));
    assert_eq!(stats["notes"]["total"], 2);
    assert_eq!(stats["notes"]["encrypted"], 1);
    assert_eq!(stats["notes"]["public"], 1);
    assert_eq!(stats["unread_messages"], 0);

    let out_dir = sandbox.dir.path().join("exports");
    let out_dir_arg = out_dir.to_string_lossy().to_string();
    let exported = json(&sandbox.run(
        &["--json", "export", "alice", "--out", &out_dir_arg],
        Some(ALICE_PASSWORD),
    ));
    let path = Path::new(exported["path"].as_str().expect("path"));
    assert!(path.starts_with(&out_dir));

    let text = std::fs::read_to_string(path).expect("export file");
    assert!(text.contains("first"));
    assert!(text.contains("[ENCRYPTED NOTE]"));
    assert!(!text.contains("hidden"));
}

#[test]
fn test_message_flow() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, false);
    sandbox.add_user("bob", "Bob", BOB_PASSWORD, false);

    let sent = sandbox.run(
        &["message", "send", "alice", "bob", "--subject", "Hi", "--body", "hey bob"],
        Some(ALICE_PASSWORD),
    );
    assert_success(&sent);

    let inbox = json(&sandbox.run(&["--json", "message", "inbox", "bob"], Some(BOB_PASSWORD)));
    let inbox = inbox.as_array().expect("array");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["from"], "alice");
    assert_eq!(inbox[0]["read"], false);
    let message_id = inbox[0]["id"].as_str().expect("id").to_string();

    // Alice has no such message in her inbox.
    let foreign = sandbox.run(&["message", "read", "alice", &message_id], Some(ALICE_PASSWORD));
    assert_eq!(foreign.status.code(), Some(3));

    let read = sandbox.run(&["message", "read", "bob", &message_id], Some(BOB_PASSWORD));
    assert_success(&read);
    assert!(stdout(&read).contains("hey bob"));

    let inbox = json(&sandbox.run(&["--json", "message", "inbox", "bob"], Some(BOB_PASSWORD)));
    assert_eq!(inbox[0]["read"], true);

    let unknown = sandbox.run(
        &["message", "send", "alice", "nobody", "--subject", "x", "--body", "y"],
        Some(ALICE_PASSWORD),
    );
    assert_eq!(unknown.status.code(), Some(3));
}

#[test]
fn test_user_list_hides_credentials() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, true);

    let output = sandbox.run(&["--json", "user", "list"], None);
    assert_success(&output);
    let users = json(&output);
    assert_eq!(users[0]["user_id"], "alice");
    assert_eq!(users[0]["is_pro"], true);
    assert!(!stdout(&output).contains("argon2"));
}

#[test]
fn test_user_delete_requires_confirmation() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.add_user("alice", "Alice", ALICE_PASSWORD, false);

    let refused = sandbox.run(&["user", "delete", "alice"], Some(ALICE_PASSWORD));
    assert_eq!(refused.status.code(), Some(4));

    let deleted = sandbox.run(&["user", "delete", "alice", "--yes"], Some(ALICE_PASSWORD));
    assert_success(&deleted);
    assert!(!sandbox.data_dir().join("users").join("alice.json").exists());
}
