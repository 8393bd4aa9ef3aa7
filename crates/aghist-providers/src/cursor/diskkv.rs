//! Bubble reader for the flat `cursorDiskKV` store, where keys follow
//! `bubbleId:{conversation_key}:{bubble_id}`.

use rusqlite::Connection;
use serde_json::Value;

use super::record::{RawRecord, role_from_discriminant};
use super::richtext;
use super::store;
use super::tools;
use crate::error::Result;
use crate::util::truthy;

/// Records from every bubble row in one store, in scan order. A store
/// without a `cursorDiskKV` table yields nothing.
pub fn read_records(conn: &Connection) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for (key, bubble) in store::kv_entries_like(conn, "bubbleId:%")? {
        let conversation_key = key.split(':').nth(1).unwrap_or("").to_string();
        let text = match bubble.get("text").and_then(Value::as_str) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => match bubble.get("richText").filter(|v| truthy(v)) {
                Some(rich) => richtext::extract_text(rich),
                None => String::new(),
            },
        };
        let tool_call = tools::extract_tool_call(&bubble);
        if text.trim().is_empty() && tool_call.is_none() {
            continue;
        }
        records.push(RawRecord {
            conversation_key,
            role: role_from_discriminant(bubble.get("type").unwrap_or(&Value::Null)),
            text: text.trim().to_string(),
            tool_call,
            timestamp: bubble.get("createdAt").and_then(Value::as_f64),
        });
    }
    Ok(records)
}
