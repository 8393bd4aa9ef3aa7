//! Locating Cursor's storage and the conversations inside it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde_json::Value;
use walkdir::WalkDir;

use super::store;

pub const GLOBAL_WORKSPACE: &str = "(global)";

/// One discovered conversation: its key, the store it was first seen in,
/// and the owning workspace (`"(global)"` for the global store).
#[derive(Debug, Clone)]
pub struct ChatHandle {
    pub conversation_key: String,
    pub db_path: PathBuf,
    pub workspace_id: String,
}

/// Platform default for Cursor's application storage.
pub fn default_root() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_default();
    if cfg!(target_os = "macos") {
        home.join("Library").join("Application Support").join("Cursor")
    } else if cfg!(target_os = "windows") {
        home.join("AppData").join("Roaming").join("Cursor")
    } else {
        home.join(".config").join("Cursor")
    }
}

/// Workspace stores under `User/workspaceStorage/{ws_id}/state.vscdb`,
/// ordered by workspace id.
pub fn workspaces(root: &Path) -> Vec<(String, PathBuf)> {
    let ws_root = root.join("User").join("workspaceStorage");
    let mut found = Vec::new();
    for entry in WalkDir::new(&ws_root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let db = entry.path().join("state.vscdb");
        if db.exists() {
            found.push((entry.file_name().to_string_lossy().into_owned(), db));
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

/// The global store, preferring `User/globalStorage/state.vscdb` and
/// falling back to the legacy per-extension sqlite files.
pub fn global_db(root: &Path) -> Option<PathBuf> {
    let storage = root.join("User").join("globalStorage");
    let primary = storage.join("state.vscdb");
    if primary.exists() {
        return Some(primary);
    }
    for legacy_dir in ["cursor.cursor", "cursor"] {
        let mut candidates: Vec<PathBuf> = WalkDir::new(storage.join(legacy_dir))
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "sqlite"))
            .collect();
        candidates.sort();
        if let Some(first) = candidates.into_iter().next() {
            return Some(first);
        }
    }
    None
}

/// Every conversation key visible across the workspace and global
/// stores, first sighting wins. Unreadable stores are skipped.
pub fn discover_handles(root: &Path) -> Vec<ChatHandle> {
    let mut handles = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (ws_id, db_path) in workspaces(root) {
        let Ok(conn) = store::open_read_only(&db_path) else {
            continue;
        };
        for key in workspace_keys(&conn) {
            if seen.insert(key.clone()) {
                handles.push(ChatHandle {
                    conversation_key: key,
                    db_path: db_path.clone(),
                    workspace_id: ws_id.clone(),
                });
            }
        }
    }

    if let Some(db_path) = global_db(root)
        && let Ok(conn) = store::open_read_only(&db_path)
    {
        for key in global_keys(&conn) {
            if seen.insert(key.clone()) {
                handles.push(ChatHandle {
                    conversation_key: key,
                    db_path: db_path.clone(),
                    workspace_id: GLOBAL_WORKSPACE.to_string(),
                });
            }
        }
    }

    handles
}

/// Conversation keys a workspace store advertises: composer ids from
/// `allComposers` plus legacy chat tab ids.
fn workspace_keys(conn: &Connection) -> Vec<String> {
    let mut keys = Vec::new();
    if let Ok(Some(composer_data)) = store::item_table_json(conn, store::COMPOSER_KEY)
        && let Some(comps) = composer_data.get("allComposers").and_then(Value::as_array)
    {
        for comp in comps {
            if let Some(id) = comp
                .get("composerId")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
            {
                keys.push(id.to_string());
            }
        }
    }
    if let Ok(Some(chat_data)) = store::item_table_json(conn, store::CHATDATA_KEY)
        && let Some(tabs) = chat_data.get("tabs").and_then(Value::as_array)
    {
        for tab in tabs {
            if let Some(id) = tab
                .get("tabId")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
            {
                keys.push(id.to_string());
            }
        }
    }
    keys
}

/// Conversation keys the global store advertises: `composerData:` stems,
/// `bubbleId:` middle segments, and legacy chat tab ids.
fn global_keys(conn: &Connection) -> Vec<String> {
    let mut keys = Vec::new();
    for pattern in ["composerData:%", "bubbleId:%"] {
        if let Ok(rows) = store::kv_keys_like(conn, pattern) {
            for key in rows {
                if let Some(mid) = key.split(':').nth(1).filter(|s| !s.is_empty()) {
                    keys.push(mid.to_string());
                }
            }
        }
    }
    if let Ok(Some(chat_data)) = store::item_table_json(conn, store::CHATDATA_KEY)
        && let Some(tabs) = chat_data.get("tabs").and_then(Value::as_array)
    {
        for tab in tabs {
            if let Some(id) = tab
                .get("tabId")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
            {
                keys.push(id.to_string());
            }
        }
    }
    keys
}
