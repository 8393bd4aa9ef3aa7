//! Legacy `ItemTable` reader: chat tabs, composer message stubs, and
//! aiService prompt/generation logs.

use aghist_types::Role;
use rusqlite::Connection;
use serde_json::Value;

use super::record::{RawRecord, role_from_discriminant};
use super::richtext;
use super::store;
use super::store::{CHATDATA_KEY, COMPOSER_KEY};
use super::tools;
use crate::error::Result;
use crate::util::{coerce_string, truthy};

/// Records from every legacy `ItemTable` source in one store, in scan
/// order. A store without an `ItemTable` yields nothing.
pub fn read_records(conn: &Connection) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    collect_chat_tabs(conn, &mut records)?;
    collect_composer_stubs(conn, &mut records)?;
    collect_ai_service(conn, &mut records)?;
    Ok(records)
}

fn collect_chat_tabs(conn: &Connection, records: &mut Vec<RawRecord>) -> Result<()> {
    let Some(chat_data) = store::item_table_json(conn, CHATDATA_KEY)? else {
        return Ok(());
    };
    let Some(tabs) = chat_data.get("tabs").and_then(Value::as_array) else {
        return Ok(());
    };
    for tab in tabs {
        let tab_id = tab
            .get("tabId")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let Some(bubbles) = tab.get("bubbles").and_then(Value::as_array) else {
            continue;
        };
        for bubble in bubbles {
            let Some(kind) = bubble.get("type").filter(|v| truthy(v)) else {
                continue;
            };
            let text = if let Some(value) = bubble.get("text") {
                value.as_str().unwrap_or("").to_string()
            } else if let Some(value) = bubble.get("content") {
                value.as_str().unwrap_or("").to_string()
            } else if let Some(value) = bubble.get("richText") {
                richtext::extract_text(value)
            } else {
                String::new()
            };
            let tool_call = tools::extract_tool_call(bubble);
            if text.trim().is_empty() && tool_call.is_none() {
                continue;
            }
            records.push(RawRecord {
                conversation_key: tab_id.to_string(),
                role: role_from_discriminant(kind),
                text: text.trim().to_string(),
                tool_call,
                timestamp: bubble.get("createdAt").and_then(Value::as_f64),
            });
        }
    }
    Ok(())
}

fn collect_composer_stubs(conn: &Connection, records: &mut Vec<RawRecord>) -> Result<()> {
    let Some(composer_data) = store::item_table_json(conn, COMPOSER_KEY)? else {
        return Ok(());
    };
    let Some(composers) = composer_data.get("allComposers").and_then(Value::as_array) else {
        return Ok(());
    };
    for comp in composers {
        let comp_id = comp
            .get("composerId")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let Some(messages) = comp.get("messages").and_then(Value::as_array) else {
            continue;
        };
        for msg in messages {
            let Some(content) = msg.get("content").filter(|v| truthy(v)) else {
                continue;
            };
            let text = coerce_string(content).trim().to_string();
            if text.is_empty() {
                continue;
            }
            records.push(RawRecord {
                conversation_key: comp_id.to_string(),
                role: role_from_discriminant(msg.get("role").unwrap_or(&Value::Null)),
                text,
                tool_call: None,
                timestamp: None,
            });
        }
    }
    Ok(())
}

/// Prompt/generation logs keyed by `aiService.*`. Prompts are user turns,
/// generations assistant turns; entries need both an id and a text.
fn collect_ai_service(conn: &Connection, records: &mut Vec<RawRecord>) -> Result<()> {
    let sources = [
        ("aiService.prompts", Role::User),
        ("aiService.generations", Role::Assistant),
    ];
    for (prefix, role) in sources {
        let pattern = format!("{prefix}%");
        let Ok(entries) = store::item_entries_like(conn, &pattern) else {
            continue;
        };
        for (_, value) in entries {
            let Some(items) = value.as_array() else { continue };
            for item in items {
                let (Some(id), Some(text)) = (item.get("id"), item.get("text")) else {
                    continue;
                };
                let text = coerce_string(text).trim().to_string();
                if text.is_empty() {
                    continue;
                }
                records.push(RawRecord {
                    conversation_key: coerce_string(id),
                    role,
                    text,
                    tool_call: None,
                    timestamp: None,
                });
            }
        }
    }
    Ok(())
}
