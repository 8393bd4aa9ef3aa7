//! Transcript parsing and document assembly for Claude Code sessions.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::{Value, json};

use aghist_core::{iso_to_date, mtime_date, now_iso_utc, timezone_label, today_date};
use aghist_types::{ChatSummary, ExportDocument, ExportMessage, ExportMetadata, Role};

use super::discovery;
use super::schema::TranscriptEntry;
use super::tools;
use crate::error::Result;
use crate::tool_map::ToolCoverage;
use crate::util::{coerce_string, truthy};

pub const DEFAULT_MODEL: &str = "Claude Sonnet 4.0";

/// Full parse of one transcript. `Ok(None)` means an empty JSONL file,
/// which callers treat the same as an unknown chat.
pub fn parse_file(path: &Path, coverage: &mut ToolCoverage) -> Result<Option<ExportDocument>> {
    let entries = read_entries(path)?;
    if entries.is_empty() && path.extension().is_some_and(|ext| ext == "jsonl") {
        return Ok(None);
    }
    Ok(Some(build_document(&entries, path, coverage)))
}

/// JSONL lines that fail to parse are skipped; a `.json` session must
/// parse whole, with a bare object wrapped as a single-entry list.
fn read_entries(path: &Path) -> Result<Vec<TranscriptEntry>> {
    if path.extension().is_some_and(|ext| ext == "jsonl") {
        let file = fs::File::open(path)?;
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Ok(entry) = serde_json::from_str::<TranscriptEntry>(line) {
                entries.push(entry);
            }
        }
        Ok(entries)
    } else {
        let raw: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        let list = match raw {
            Value::Array(items) => items,
            other => vec![other],
        };
        let mut entries = Vec::with_capacity(list.len());
        for item in list {
            entries.push(serde_json::from_value(item)?);
        }
        Ok(entries)
    }
}

fn build_document(
    entries: &[TranscriptEntry],
    path: &Path,
    coverage: &mut ToolCoverage,
) -> ExportDocument {
    let created_at = entries
        .iter()
        .find_map(|e| e.timestamp.clone().filter(|t| !t.is_empty()))
        .unwrap_or_else(now_iso_utc);
    let model = entries
        .iter()
        .filter(|e| e.kind == "assistant")
        .find_map(|e| {
            e.message
                .as_ref()
                .and_then(|m| m.model.as_deref())
                .filter(|m| !m.is_empty())
        })
        .map(prettify_model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let title = entries
        .iter()
        .filter(|e| e.kind == "user")
        .find_map(|e| {
            let text = extract_text(e.content());
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(truncated(trimmed, text.chars().count(), 100))
            }
        })
        .unwrap_or_else(|| fallback_title(path));

    ExportDocument {
        title,
        metadata: ExportMetadata {
            model,
            chat_timezone: timezone_label(),
            project: discovery::project_name(path),
        },
        created_at,
        messages: transform_messages(entries, coverage),
    }
}

/// Messages in transcript order. The first pass collects `tool_result`
/// blocks by `tool_use_id`; the second emits user text, assistant text
/// blocks, and assistant `tool_use` blocks joined with their results.
fn transform_messages(entries: &[TranscriptEntry], coverage: &mut ToolCoverage) -> Vec<ExportMessage> {
    let results = collect_tool_results(entries);
    let mut messages = Vec::new();
    for entry in entries {
        let timestamp = entry.timestamp.clone().unwrap_or_default();
        match entry.kind.as_str() {
            "user" => {
                let content = entry.content();
                // Tool-result carriers were consumed by the first pass.
                if let Some(items) = content.as_array()
                    && items
                        .iter()
                        .any(|item| item.get("type").and_then(Value::as_str) == Some("tool_result"))
                {
                    continue;
                }
                let text = extract_text(content);
                if text.trim().is_empty() {
                    continue;
                }
                messages.push(ExportMessage::text(Role::User, text, timestamp));
            }
            "assistant" => {
                let Some(items) = entry.content().as_array() else {
                    continue;
                };
                for item in items {
                    match item.get("type").and_then(Value::as_str) {
                        Some("text") => {
                            let text = item.get("text").and_then(Value::as_str).unwrap_or("");
                            if !text.trim().is_empty() {
                                messages.push(ExportMessage::text(
                                    Role::Assistant,
                                    text,
                                    timestamp.clone(),
                                ));
                            }
                        }
                        Some("tool_use") => {
                            let name = item.get("name").and_then(Value::as_str).unwrap_or("");
                            let input = item.get("input").cloned().unwrap_or_else(|| json!({}));
                            let output =
                                lookup_output(item.get("id").and_then(Value::as_str), &results);
                            if let Some(call) =
                                tools::normalize_tool_call(name, &input, &output, coverage)
                            {
                                messages.push(ExportMessage::tool(
                                    Role::Assistant,
                                    call,
                                    timestamp.clone(),
                                ));
                            }
                        }
                        // Thinking blocks never reach the export.
                        _ => {}
                    }
                }
            }
            // file-history-snapshot, summary, and system entries.
            _ => {}
        }
    }
    messages
}

struct StoredResult {
    content: Value,
    tool_use_result: Option<Value>,
}

fn collect_tool_results(entries: &[TranscriptEntry]) -> HashMap<String, StoredResult> {
    let mut results = HashMap::new();
    for entry in entries {
        if entry.kind != "user" {
            continue;
        }
        let Some(items) = entry.content().as_array() else {
            continue;
        };
        for item in items {
            if item.get("type").and_then(Value::as_str) != Some("tool_result") {
                continue;
            }
            let Some(id) = item
                .get("tool_use_id")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            results.insert(
                id.to_string(),
                StoredResult {
                    content: item
                        .get("content")
                        .cloned()
                        .unwrap_or_else(|| Value::String(String::new())),
                    tool_use_result: entry.tool_use_result.clone(),
                },
            );
        }
    }
    results
}

/// The paired result content, with `toolUseResult.stdout`/`stderr`
/// preferred when that richer payload exists.
fn lookup_output(id: Option<&str>, results: &HashMap<String, StoredResult>) -> Value {
    let Some(stored) = id.and_then(|id| results.get(id)) else {
        return Value::String(String::new());
    };
    if let Some(Value::Object(extra)) = &stored.tool_use_result {
        if let Some(stdout) = extra.get("stdout").filter(|v| truthy(v)) {
            return stdout.clone();
        }
        if let Some(stderr) = extra.get("stderr").filter(|v| truthy(v)) {
            return stderr.clone();
        }
    }
    stored.content.clone()
}

/// Message text from either content shape: a bare string, or a block
/// list whose text parts join with newlines.
pub(crate) fn extract_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let mut parts = Vec::new();
            for item in items {
                match item {
                    Value::Object(obj) => {
                        if let Some(text) = obj.get("text") {
                            parts.push(coerce_string(text));
                        }
                    }
                    Value::String(s) => parts.push(s.clone()),
                    _ => {}
                }
            }
            parts.join("\n")
        }
        other if truthy(other) => coerce_string(other),
        _ => String::new(),
    }
}

/// Minimal listing metadata. JSONL transcripts are probed by their first
/// ten lines only; `.json` sessions by their first entry. An unreadable
/// JSONL file is left out of the listing.
pub fn summarize(path: &Path) -> Option<ChatSummary> {
    let mut title = None;
    let mut date = None;
    if path.extension().is_some_and(|ext| ext == "jsonl") {
        let file = fs::File::open(path).ok()?;
        for line in BufReader::new(file).lines().take(10) {
            let line = line.ok()?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Ok(entry) = serde_json::from_str::<TranscriptEntry>(line) else {
                continue;
            };
            probe_entry(&entry, &mut title, &mut date);
        }
    } else if let Ok(raw) = fs::read_to_string(path)
        && let Ok(value) = serde_json::from_str::<Value>(&raw)
    {
        let first = match value {
            Value::Array(mut items) if !items.is_empty() => Some(items.remove(0)),
            Value::Array(_) => None,
            other => Some(other),
        };
        if let Some(first) = first
            && let Ok(entry) = serde_json::from_value::<TranscriptEntry>(first)
        {
            probe_entry(&entry, &mut title, &mut date);
        }
    }
    Some(ChatSummary {
        id: discovery::file_id(path),
        title: title.unwrap_or_else(|| fallback_title(path)),
        date: date.unwrap_or_else(|| {
            fs::metadata(path)
                .and_then(|m| m.modified())
                .map(mtime_date)
                .unwrap_or_else(|_| today_date())
        }),
        file_path: path.to_string_lossy().into_owned(),
    })
}

fn probe_entry(entry: &TranscriptEntry, title: &mut Option<String>, date: &mut Option<String>) {
    if title.is_none() && entry.kind == "user" {
        let text = extract_text(entry.content());
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            *title = Some(truncated(trimmed, text.chars().count(), 100));
        }
    }
    if date.is_none()
        && let Some(ts) = entry.timestamp.as_deref().filter(|t| !t.is_empty())
        && let Some(day) = iso_to_date(ts)
    {
        *date = Some(day);
    }
}

fn truncated(trimmed: &str, raw_len: usize, limit: usize) -> String {
    let mut title: String = trimmed.chars().take(limit).collect();
    if raw_len > limit {
        title.push_str("...");
    }
    title
}

/// Session-id file names make serviceable titles when no user text does.
fn fallback_title(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name
        .strip_suffix(".jsonl")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(&name);
    if stem.chars().count() > 50 {
        let cut: String = stem.chars().take(50).collect();
        format!("{cut}...")
    } else {
        stem.to_string()
    }
}

fn prettify_model(raw: &str) -> String {
    if raw.contains("claude-sonnet-4") || raw.contains("sonnet-4") {
        "Claude Sonnet 4.0".to_string()
    } else if raw.contains("claude-sonnet-3") || raw.contains("sonnet-3") {
        "Claude Sonnet 3.5".to_string()
    } else if raw.contains("claude-opus") {
        "Claude Opus".to_string()
    } else if raw.contains("claude-haiku") {
        "Claude Haiku".to_string()
    } else {
        title_case(&raw.replace("claude-", "Claude ").replace('-', " "))
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
