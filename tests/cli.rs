//! CLI integration tests for the diagmarm binary.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use assert_cmd::Command;
use assert_fs::TempDir;
use diagmarm::store::{SqliteStore, Store};
use predicates::prelude::*;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn db_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("nested").join("diagrams.db")
    }

    fn db_uri(&self) -> String {
        format!("sqlite:///{}", self.db_path().display())
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("diagmarm").expect("failed to find binary");
        cmd.env("NO_COLOR", "1")
            .env_remove("DATABASE_URI")
            .env_remove("PORT")
            .env_remove("ANTHROPIC_API_KEY");
        cmd
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["init", "--database-uri", &self.db_uri()])
            .assert()
    }
}

#[test]
fn test_init_creates_database_and_root() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Created root folder"));

    assert!(ctx.db_path().exists());

    let store = SqliteStore::new(ctx.db_path()).unwrap();
    let root = store.get_root_folder().unwrap().expect("root folder");
    assert!(root.is_root);
    assert_eq!(root.name, "Root");
}

#[test]
fn test_init_is_idempotent() {
    let ctx = TestContext::new();
    ctx.init().success();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Root folder already exists"));
}

#[test]
fn test_init_files_legacy_diagrams() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(ctx.db_path().parent().unwrap()).unwrap();

    let conn = rusqlite::Connection::open(ctx.db_path()).unwrap();
    conn.execute_batch(
        "CREATE TABLE diagrams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            last_updated TEXT,
            name TEXT
        );
        INSERT INTO diagrams (content, last_updated, name)
            VALUES ('graph TD\nA-->B', '2024-01-01 10:00:00', 'Old');",
    )
    .unwrap();
    drop(conn);

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Unfiled diagrams moved to root: 1"));

    let store = SqliteStore::new(ctx.db_path()).unwrap();
    let root = store.get_root_folder().unwrap().unwrap();
    let diagrams = store.list_folder_diagrams(root.id).unwrap();
    assert_eq!(diagrams.len(), 1);
    assert_eq!(diagrams[0].name.as_deref(), Some("Old"));
}

#[test]
fn test_unsupported_database_uri() {
    let ctx = TestContext::new();

    ctx.cmd()
        .args(["init", "--database-uri", "postgres://localhost/diagrams"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only sqlite is supported"));
}

#[test]
fn test_invalid_port_env() {
    let ctx = TestContext::new();

    ctx.cmd()
        .env("PORT", "not-a-port")
        .args(["init", "--database-uri", &ctx.db_uri()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid PORT"));
}
