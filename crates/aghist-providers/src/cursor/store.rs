//! Read-only access to Cursor's `state.vscdb` SQLite stores.
//!
//! Every query probes `sqlite_master` first: a database missing the
//! expected table is an empty source, not an error. Values are read as
//! raw bytes because Cursor writes some rows as TEXT and some as BLOB.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde_json::Value;

use crate::error::Result;

pub(crate) const CHATDATA_KEY: &str = "workbench.panel.aichat.view.aichat.chatdata";
pub(crate) const COMPOSER_KEY: &str = "composer.composerData";

/// Open a store without taking any lock that could disturb a live editor.
pub fn open_read_only(path: &Path) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Ok(Connection::open_with_flags(path, flags)?)
}

pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// JSON value stored under `key` in `ItemTable`, if the table, the row,
/// and a parseable payload all exist.
pub fn item_table_json(conn: &Connection, key: &str) -> Result<Option<Value>> {
    if !table_exists(conn, "ItemTable")? {
        return Ok(None);
    }
    let raw: Option<Vec<u8>> = conn
        .query_row("SELECT value FROM ItemTable WHERE key = ?1", [key], |row| {
            Ok(row.get_ref(0)?.as_bytes()?.to_vec())
        })
        .optional()?;
    Ok(raw.and_then(|bytes| serde_json::from_slice(&bytes).ok()))
}

/// All `(key, value)` rows in `ItemTable` whose key matches a LIKE pattern.
/// Rows with NULL or unparseable payloads are dropped.
pub fn item_entries_like(conn: &Connection, pattern: &str) -> Result<Vec<(String, Value)>> {
    if !table_exists(conn, "ItemTable")? {
        return Ok(Vec::new());
    }
    rows_like(conn, "SELECT key, value FROM ItemTable WHERE key LIKE ?1", pattern)
}

/// All `(key, value)` rows in `cursorDiskKV` whose key matches a LIKE
/// pattern. Rows with NULL or unparseable payloads are dropped.
pub fn kv_entries_like(conn: &Connection, pattern: &str) -> Result<Vec<(String, Value)>> {
    if !table_exists(conn, "cursorDiskKV")? {
        return Ok(Vec::new());
    }
    rows_like(conn, "SELECT key, value FROM cursorDiskKV WHERE key LIKE ?1", pattern)
}

/// Keys in `cursorDiskKV` matching a LIKE pattern, without touching values.
pub fn kv_keys_like(conn: &Connection, pattern: &str) -> Result<Vec<String>> {
    if !table_exists(conn, "cursorDiskKV")? {
        return Ok(Vec::new());
    }
    let mut stmt = conn.prepare("SELECT key FROM cursorDiskKV WHERE key LIKE ?1")?;
    let rows = stmt.query_map([pattern], |row| row.get(0))?;
    let mut keys = Vec::new();
    for key in rows {
        keys.push(key?);
    }
    Ok(keys)
}

/// JSON value stored under an exact `cursorDiskKV` key.
pub fn kv_value(conn: &Connection, key: &str) -> Result<Option<Value>> {
    if !table_exists(conn, "cursorDiskKV")? {
        return Ok(None);
    }
    let raw: Option<Vec<u8>> = conn
        .query_row("SELECT value FROM cursorDiskKV WHERE key = ?1", [key], |row| {
            Ok(row.get_ref(0)?.as_bytes()?.to_vec())
        })
        .optional()?;
    Ok(raw.and_then(|bytes| serde_json::from_slice(&bytes).ok()))
}

fn rows_like(conn: &Connection, sql: &str, pattern: &str) -> Result<Vec<(String, Value)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([pattern], |row| {
        let key: String = row.get(0)?;
        let value: Option<Vec<u8>> = row.get_ref(1)?.as_bytes_or_null()?.map(<[u8]>::to_vec);
        Ok((key, value))
    })?;
    let mut entries = Vec::new();
    for row in rows {
        let (key, value) = row?;
        let Some(bytes) = value else { continue };
        let Ok(json) = serde_json::from_slice(&bytes) else {
            continue;
        };
        entries.push((key, json));
    }
    Ok(entries)
}
