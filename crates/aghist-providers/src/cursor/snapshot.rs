//! Composer snapshot reader: full conversation arrays stored under
//! `composerData:{conversation_key}` in `cursorDiskKV`.

use rusqlite::Connection;
use serde_json::Value;

use super::record::{RawRecord, role_from_discriminant};
use super::store;
use super::tools;
use crate::error::Result;

/// Session metadata carried by a composer snapshot blob.
#[derive(Debug, Clone, Default)]
pub struct SnapshotMeta {
    pub conversation_key: String,
    pub title: Option<String>,
    pub created_at: Option<f64>,
}

pub fn meta_from_blob(conversation_key: &str, data: &Value) -> SnapshotMeta {
    SnapshotMeta {
        conversation_key: conversation_key.to_string(),
        title: data
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        created_at: data.get("createdAt").and_then(Value::as_f64),
    }
}

/// Records from every composer snapshot in one store. Entries without a
/// type discriminant are skipped.
pub fn read_records(conn: &Connection) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for (key, data) in store::kv_entries_like(conn, "composerData:%")? {
        let conversation_key = key.split(':').nth(1).unwrap_or("").to_string();
        let Some(conversation) = data.get("conversation").and_then(Value::as_array) else {
            continue;
        };
        for msg in conversation {
            let Some(kind) = msg.get("type") else { continue };
            if kind.is_null() {
                continue;
            }
            let tool_call = tools::extract_tool_call(msg);
            let text = msg.get("text").and_then(Value::as_str).unwrap_or("");
            if text.is_empty() && tool_call.is_none() {
                continue;
            }
            records.push(RawRecord {
                conversation_key: conversation_key.clone(),
                role: role_from_discriminant(kind),
                text: text.to_string(),
                tool_call,
                timestamp: None,
            });
        }
    }
    Ok(records)
}

/// Title and creation time from every snapshot blob.
pub fn read_metadata(conn: &Connection) -> Result<Vec<SnapshotMeta>> {
    let mut metas = Vec::new();
    for (key, data) in store::kv_entries_like(conn, "composerData:%")? {
        let conversation_key = key.split(':').nth(1).unwrap_or("");
        metas.push(meta_from_blob(conversation_key, &data));
    }
    Ok(metas)
}
