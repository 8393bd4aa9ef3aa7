//! End-to-end tests for the Cursor provider against fixture SQLite
//! stores laid out the way a real Cursor install is.

use std::path::Path;

use rusqlite::Connection;
use serde_json::{Value, json};
use tempfile::TempDir;

use aghist_providers::{ChatProvider, CursorProvider, Error};

fn open_store(path: &Path) -> Connection {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE ItemTable (key TEXT PRIMARY KEY, value BLOB);
         CREATE TABLE cursorDiskKV (key TEXT PRIMARY KEY, value BLOB);",
    )
    .unwrap();
    conn
}

fn insert(conn: &Connection, table: &str, key: &str, value: &Value) {
    conn.execute(
        &format!("INSERT INTO {table} (key, value) VALUES (?1, ?2)"),
        rusqlite::params![key, value.to_string()],
    )
    .unwrap();
}

/// One workspace conversation (`conv-a`) whose bubbles live in the
/// workspace store, one stray assistant bubble for it in the global
/// store, and one untitled conversation (`conv-b`) that exists only as
/// a global composer snapshot.
fn seed_root() -> TempDir {
    let root = TempDir::new().unwrap();

    let ws_db = root
        .path()
        .join("User")
        .join("workspaceStorage")
        .join("ws1")
        .join("state.vscdb");
    let conn = open_store(&ws_db);
    insert(
        &conn,
        "ItemTable",
        "composer.composerData",
        &json!({
            "allComposers": [{
                "composerId": "conv-a",
                "name": "Wire up the release pipeline",
                "createdAt": 1736935200000.0,
                "lastUpdatedAt": 1736942400000.0
            }]
        }),
    );
    insert(
        &conn,
        "ItemTable",
        "history.entries",
        &json!([
            {"editor": {"resource": "file:///home/dev/projects/lanegrid/src/main.rs"}},
            {"editor": {"resource": "file:///home/dev/projects/lanegrid/README.md"}}
        ]),
    );
    insert(
        &conn,
        "cursorDiskKV",
        "bubbleId:conv-a:b1",
        &json!({"type": 1, "text": "Set up a release pipeline", "createdAt": 1736935200000.0}),
    );
    insert(
        &conn,
        "cursorDiskKV",
        "bubbleId:conv-a:b2",
        &json!({
            "type": 2,
            "toolFormerData": {
                "name": "run_terminal_cmd",
                "params": {
                    "parsingResult": {
                        "executableCommands": [{"fullText": "gh release create v1.4.0"}]
                    }
                }
            },
            "createdAt": 1736935215000.0
        }),
    );
    insert(
        &conn,
        "cursorDiskKV",
        "bubbleId:conv-a:b3",
        &json!({"type": 2, "text": "Pipeline is green.", "createdAt": 1736935230000.0}),
    );

    let global_db = root
        .path()
        .join("User")
        .join("globalStorage")
        .join("state.vscdb");
    let conn = open_store(&global_db);
    insert(
        &conn,
        "cursorDiskKV",
        "composerData:conv-b",
        &json!({
            "name": "",
            "createdAt": 1736899200000.0,
            "conversation": [
                {"type": 1, "text": "Quick question about lifetimes"},
                {"type": 2, "text": "Here is the short version."}
            ]
        }),
    );
    insert(
        &conn,
        "cursorDiskKV",
        "bubbleId:conv-a:b9",
        &json!({"type": 2, "text": "Tagged v1.4.0.", "createdAt": 1736942400000.0}),
    );
    insert(
        &conn,
        "cursorDiskKV",
        "bubbleId:conv-b:x1",
        &json!({"type": 2, "toolFormerData": {"name": "mystery_tool", "params": {}}}),
    );

    root
}

#[test]
fn test_list_metadata_covers_workspace_and_global_chats() {
    let root = seed_root();
    let provider = CursorProvider::with_root(root.path().to_path_buf());

    let summaries = provider.list_metadata().unwrap();
    assert_eq!(summaries.len(), 2);

    assert_eq!(summaries[0].title, "Wire up the release pipeline");
    assert_eq!(summaries[0].date, "2025-01-15");
    assert!(summaries[0].file_path.ends_with("state.vscdb"));

    assert_eq!(summaries[1].title, "Chat conv-b");
    assert_eq!(summaries[1].date, "2025-01-15");

    assert_ne!(summaries[0].id, summaries[1].id);
    for summary in &summaries {
        assert_eq!(summary.id.len(), 16);
        assert!(summary.id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn test_parse_by_id_rebuilds_from_the_handle_store_only() {
    let root = seed_root();
    let provider = CursorProvider::with_root(root.path().to_path_buf());

    let summaries = provider.list_metadata().unwrap();
    let doc = provider.parse_by_id(&summaries[0].id).unwrap();

    assert_eq!(doc.title, "Wire up the release pipeline");
    assert_eq!(doc.metadata.project, "lanegrid");
    assert_eq!(doc.created_at, "2025-01-15T10:00:00Z");

    // The stray bubble in the global store is not visible from the
    // workspace handle.
    assert_eq!(doc.messages.len(), 3);
    assert_eq!(
        serde_json::to_value(&doc.messages[1]).unwrap(),
        json!({
            "role": "assistant",
            "type": "tool",
            "content": {
                "tool_name": "terminal",
                "tool_input": "gh release create v1.4.0",
                "tool_output": ""
            },
            "timestamp": "2025-01-15T10:00:15Z"
        })
    );
}

#[test]
fn test_parse_by_id_unknown_id_errors() {
    let root = seed_root();
    let provider = CursorProvider::with_root(root.path().to_path_buf());

    let err = provider.parse_by_id("ffffffffffffffff").unwrap_err();
    assert!(matches!(err, Error::ChatNotFound(_)));
}

#[test]
fn test_extract_all_merges_global_rows_into_the_workspace_chat() {
    let root = seed_root();
    let provider = CursorProvider::with_root(root.path().to_path_buf());

    let outcome = provider.extract_all().unwrap();
    let titles: Vec<&str> = outcome
        .documents
        .iter()
        .map(|d| d.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Wire up the release pipeline", "Chat conv-b"]);

    assert_eq!(outcome.coverage.unknown.get("mystery_tool"), Some(&1));
    assert!(outcome.coverage.skipped.is_empty());

    insta::assert_json_snapshot!(outcome.documents[0], {
        ".metadata.chat_timezone" => "[timezone]"
    }, @r###"
    {
      "title": "Wire up the release pipeline",
      "metadata": {
        "model": "Claude Sonnet 4.0",
        "chat_timezone": "[timezone]",
        "Project": "lanegrid"
      },
      "createdAt": "2025-01-15T10:00:00Z",
      "messages": [
        {
          "role": "user",
          "type": "text",
          "content": "Set up a release pipeline",
          "timestamp": "2025-01-15T10:00:00Z"
        },
        {
          "role": "assistant",
          "type": "tool",
          "content": {
            "tool_name": "terminal",
            "tool_input": "gh release create v1.4.0",
            "tool_output": ""
          },
          "timestamp": "2025-01-15T10:00:15Z"
        },
        {
          "role": "assistant",
          "type": "text",
          "content": "Pipeline is green.",
          "timestamp": "2025-01-15T10:00:30Z"
        },
        {
          "role": "assistant",
          "type": "text",
          "content": "Tagged v1.4.0.",
          "timestamp": "2025-01-15T12:00:00Z"
        }
      ]
    }
    "###);
}

#[test]
fn test_untitled_global_chat_gets_stem_title_and_synthetic_clock() {
    let root = seed_root();
    let provider = CursorProvider::with_root(root.path().to_path_buf());

    let outcome = provider.extract_all().unwrap();
    let doc = &outcome.documents[1];

    assert_eq!(doc.title, "Chat conv-b");
    assert_eq!(doc.metadata.project, "Unknown Project");
    assert_eq!(doc.created_at, "2025-01-15T00:00:00Z");

    // Snapshot records carry no timestamps; the clock steps 15 seconds
    // from the creation time.
    let stamps: Vec<&str> = doc.messages.iter().map(|m| m.timestamp.as_str()).collect();
    assert_eq!(stamps, vec!["2025-01-15T00:00:00Z", "2025-01-15T00:00:15Z"]);
}

#[test]
fn test_missing_root_lists_nothing() {
    let root = TempDir::new().unwrap();
    let provider = CursorProvider::with_root(root.path().join("absent"));

    assert!(provider.list_metadata().unwrap().is_empty());
    assert!(provider.extract_all().unwrap().documents.is_empty());
}
