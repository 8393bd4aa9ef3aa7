//! Common test utilities shared across integration tests.
//!
//! Note: Clippy cannot track usage across integration test files,
//! hence the `allow(dead_code)` annotation.
#![cfg(test)]
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use rusqlite::Connection;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Temporary storage roots for all three agents, wired into the binary
/// through the root-override flags. The fixture directory is also the
/// working directory, so relative `result/` paths land inside it.
pub struct TestFixture {
    temp_dir: TempDir,
    cursor_root: PathBuf,
    claude_root: PathBuf,
    copilot_root: PathBuf,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cursor_root = temp_dir.path().join("cursor");
        let claude_root = temp_dir.path().join("claude");
        let copilot_root = temp_dir.path().join("copilot");

        fs::create_dir_all(&cursor_root).expect("Failed to create cursor root");
        fs::create_dir_all(&claude_root).expect("Failed to create claude root");
        fs::create_dir_all(&copilot_root).expect("Failed to create copilot root");

        Self {
            temp_dir,
            cursor_root,
            claude_root,
            copilot_root,
        }
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn copilot_root(&self) -> &PathBuf {
        &self.copilot_root
    }

    /// Run aghist against this fixture's roots, with the fixture
    /// directory as the working directory.
    pub fn command(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("aghist");
        cmd.current_dir(self.temp_dir.path())
            .arg("--cursor-root")
            .arg(&self.cursor_root)
            .arg("--claude-root")
            .arg(&self.claude_root)
            .arg("--copilot-root")
            .arg(&self.copilot_root);
        cmd
    }

    /// One Cursor conversation from 2025-01-15 with a tool name the
    /// registry does not know, for coverage reporting.
    pub fn seed_cursor(&self) {
        let db_path = self
            .cursor_root
            .join("User")
            .join("workspaceStorage")
            .join("ws1")
            .join("state.vscdb");
        fs::create_dir_all(db_path.parent().unwrap()).expect("Failed to create workspace dir");

        let conn = Connection::open(&db_path).expect("Failed to open store");
        conn.execute_batch(
            "CREATE TABLE ItemTable (key TEXT PRIMARY KEY, value BLOB);
             CREATE TABLE cursorDiskKV (key TEXT PRIMARY KEY, value BLOB);",
        )
        .expect("Failed to create tables");

        let insert = |table: &str, key: &str, value: &Value| {
            conn.execute(
                &format!("INSERT INTO {table} (key, value) VALUES (?1, ?2)"),
                rusqlite::params![key, value.to_string()],
            )
            .expect("Failed to insert row");
        };

        insert(
            "ItemTable",
            "composer.composerData",
            &json!({
                "allComposers": [{
                    "composerId": "cursor-conv",
                    "name": "Fix the flaky test",
                    "createdAt": 1736935200000.0,
                    "lastUpdatedAt": 1736942400000.0
                }]
            }),
        );
        insert(
            "ItemTable",
            "history.entries",
            &json!([{"editor": {"resource": "file:///home/dev/projects/flaky/tests/api.rs"}}]),
        );
        insert(
            "cursorDiskKV",
            "bubbleId:cursor-conv:b1",
            &json!({"type": 1, "text": "The api test keeps flaking", "createdAt": 1736935200000.0}),
        );
        insert(
            "cursorDiskKV",
            "bubbleId:cursor-conv:b2",
            &json!({"type": 2, "toolFormerData": {"name": "mystery_tool", "params": {}}, "createdAt": 1736935215000.0}),
        );
        insert(
            "cursorDiskKV",
            "bubbleId:cursor-conv:b3",
            &json!({"type": 2, "text": "Pinned the port; should be stable now.", "createdAt": 1736935230000.0}),
        );
    }

    /// One Claude Code transcript from 2025-03-01.
    pub fn seed_claude(&self) {
        let dir = self.claude_root.join("-home-dev-uploader");
        fs::create_dir_all(&dir).expect("Failed to create project dir");
        let lines = [
            r#"{"type":"user","timestamp":"2025-03-01T09:30:00Z","message":{"content":"Add retry logic to the uploader"}}"#,
            r#"{"type":"assistant","timestamp":"2025-03-01T09:30:10Z","message":{"model":"claude-sonnet-4-20250514","content":[{"type":"text","text":"Added exponential backoff."}]}}"#,
        ];
        fs::write(dir.join("s1.jsonl"), lines.join("\n")).expect("Failed to write transcript");
    }

    /// One Copilot session from 2025-02-10.
    pub fn seed_copilot(&self) {
        let ws = self.copilot_root.join("ws1");
        let sessions = ws.join("chatSessions");
        fs::create_dir_all(&sessions).expect("Failed to create chatSessions dir");
        fs::write(
            ws.join("workspace.json"),
            json!({"folder": "file:///home/dev/shipit"}).to_string(),
        )
        .expect("Failed to write workspace.json");
        fs::write(
            sessions.join("work.json"),
            json!({
                "customTitle": "Trim the Docker image",
                "sessionId": "9f2c1a77-4242",
                "creationDate": 1739181600000.0,
                "responderUsername": "GitHub Copilot",
                "requests": [{
                    "message": {"text": "Make the image smaller"},
                    "timestamp": 1739181610000.0,
                    "response": [{"value": "Use a multi-stage build."}]
                }]
            })
            .to_string(),
        )
        .expect("Failed to write session");
    }

    pub fn seed_all(&self) {
        self.seed_cursor();
        self.seed_claude();
        self.seed_copilot();
    }

    /// Pull the 16-hex chat ID out of a `list` row matching `needle`.
    pub fn chat_id_from_list(&self, needle: &str) -> String {
        let output = self
            .command()
            .arg("list")
            .output()
            .expect("Failed to run list");
        assert!(
            output.status.success(),
            "list failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .find(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("no list row matching {:?} in:\n{}", needle, stdout));
        line.trim_start()
            .split_whitespace()
            .next()
            .expect("list row should start with an ID")
            .to_string()
    }
}
