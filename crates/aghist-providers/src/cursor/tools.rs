//! Tool-call capture and canonical shaping for Cursor records.
//!
//! Capture is shape-tolerant: the current stores embed invocations in a
//! `toolFormerData` sub-record, older ones use flat `tool`/`toolName`/
//! `toolInput` fields. Shaping never errors; an unexpected payload
//! degrades to a passthrough or an empty value.

use aghist_types::{CanonicalTool, NormalizedToolCall, Vendor};
use serde_json::{Map, Value, json};

use super::record::RawToolCall;
use crate::tool_map::{self, NameMapping, ToolCoverage};
use crate::util::{basename, coerce_string, truthy};

/// Pull a raw tool invocation out of a bubble or conversation entry.
pub fn extract_tool_call(entry: &Value) -> Option<RawToolCall> {
    if let Some(former) = entry.get("toolFormerData").and_then(Value::as_object)
        && !former.is_empty()
    {
        let name = former.get("name").and_then(Value::as_str).unwrap_or("");
        if !name.is_empty() {
            return Some(RawToolCall {
                name: name.to_string(),
                input: former_input(former),
                output: former_output(former.get("result")),
            });
        }
    }

    let tool = entry.get("tool").filter(|v| truthy(v))?;
    let name_value = entry.get("toolName").filter(|v| truthy(v)).unwrap_or(tool);
    let input = entry
        .get("toolInput")
        .filter(|v| truthy(v))
        .or_else(|| entry.get("tool_input"))
        .cloned()
        .unwrap_or_else(|| json!({}));
    let output = entry
        .get("toolOutput")
        .filter(|v| truthy(v))
        .or_else(|| entry.get("tool_output").filter(|v| truthy(v)))
        .or_else(|| entry.get("tool_response"))
        .cloned()
        .unwrap_or_else(|| json!(""));
    Some(RawToolCall {
        name: coerce_string(name_value),
        input,
        output,
    })
}

/// Arguments from `params` when populated, else `rawArgs`. Either may be
/// a JSON-encoded string; one that fails to parse is kept under `raw`.
fn former_input(former: &Map<String, Value>) -> Value {
    let candidate = former
        .get("params")
        .filter(|v| truthy(v))
        .or_else(|| former.get("rawArgs").filter(|v| truthy(v)));
    match candidate {
        Some(Value::String(raw)) => {
            serde_json::from_str(raw).unwrap_or_else(|_| json!({ "raw": raw }))
        }
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => json!({}),
    }
}

fn former_output(result: Option<&Value>) -> Value {
    let Some(value) = result else { return json!("") };
    match value {
        Value::String(_) => value.clone(),
        Value::Object(_) => json!(serde_json::to_string_pretty(value).unwrap_or_default()),
        Value::Null => json!(""),
        other => json!(coerce_string(other)),
    }
}

/// Map and shape a raw call into canonical form. Returns None when the
/// name has no mapping or the shaped input signals an empty todo list;
/// dropped names are tallied either way.
pub fn normalize_tool_call(
    raw: &RawToolCall,
    coverage: &mut ToolCoverage,
) -> Option<NormalizedToolCall> {
    let canonical = match tool_map::map_tool_name(Vendor::Cursor, &raw.name) {
        NameMapping::Canonical(tool) => tool,
        NameMapping::Skip => {
            coverage.record_skip(&raw.name);
            return None;
        }
        NameMapping::Unknown => {
            coverage.record_unknown(&raw.name);
            return None;
        }
    };
    let tool_input = shape_input(canonical, &raw.input)?;
    let tool_output = shape_output(canonical, &raw.output);
    Some(NormalizedToolCall {
        tool_name: canonical,
        tool_input,
        tool_output,
    })
}

fn shape_input(tool: CanonicalTool, input: &Value) -> Option<Value> {
    match tool {
        CanonicalTool::WebRequest => Some(web_request_input(input)),
        CanonicalTool::Read => Some(read_input(input)),
        CanonicalTool::Terminal => Some(terminal_input(input)),
        CanonicalTool::Todo => todo_input(input),
        CanonicalTool::Create => Some(create_input(input)),
        CanonicalTool::Update => Some(update_input(input)),
        CanonicalTool::Delete => Some(input.clone()),
    }
}

fn shape_output(tool: CanonicalTool, output: &Value) -> Value {
    match tool {
        CanonicalTool::Update => update_output(output),
        CanonicalTool::Delete => output.clone(),
        _ => json!(""),
    }
}

fn web_request_input(input: &Value) -> Value {
    let mut result = Map::new();
    match input {
        Value::Object(map) => {
            if let Some(term) = map.get("searchTerm") {
                result.insert("request".to_string(), term.clone());
            }
            if let Some(url) = map.get("url") {
                result.insert("url".to_string(), url.clone());
            }
        }
        Value::String(s) => {
            result.insert("request".to_string(), json!(s));
        }
        _ => {}
    }
    if result.contains_key("request") {
        Value::Object(result)
    } else {
        input.clone()
    }
}

/// Reduce any read-like input to an array of file paths.
fn read_input(input: &Value) -> Value {
    match input {
        Value::Object(map) => {
            if let Some(results) = map.get("codeResults").and_then(Value::as_array) {
                let files: Vec<Value> = results
                    .iter()
                    .filter_map(|r| r.get("codeBlock"))
                    .filter_map(|block| block.get("relativeWorkspacePath"))
                    .filter(|path| truthy(path))
                    .cloned()
                    .collect();
                if !files.is_empty() {
                    return Value::Array(files);
                }
            } else if let Some(path) = map.get("path") {
                return wrap_path(path);
            } else if let Some(target) = map.get("targetFile") {
                return wrap_path(target);
            }
            input.clone()
        }
        Value::String(s) if !s.is_empty() => json!([s]),
        Value::String(_) => json!([]),
        _ => input.clone(),
    }
}

fn wrap_path(value: &Value) -> Value {
    if truthy(value) {
        json!([value.clone()])
    } else {
        json!([])
    }
}

fn terminal_input(input: &Value) -> Value {
    if let Some(command) = input
        .pointer("/parsingResult/executableCommands/0/fullText")
        .filter(|v| truthy(v))
    {
        return command.clone();
    }
    input.clone()
}

/// `{description?, todos: [{name, status}]}` from a plan payload. Items
/// with blank names are discarded; None means nothing survived and the
/// call should be dropped.
fn todo_input(input: &Value) -> Option<Value> {
    let Value::Object(map) = input else {
        return Some(input.clone());
    };
    let description = map
        .get("overview")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty());
    let mut todos = Vec::new();
    if let Some(items) = map.get("todos").and_then(Value::as_array) {
        for item in items {
            let Some(name) = item.get("content").and_then(Value::as_str) else {
                continue;
            };
            if name.trim().is_empty() {
                continue;
            }
            let status = item.get("status").cloned().unwrap_or_else(|| json!(""));
            todos.push(json!({ "name": name, "status": status }));
        }
    }
    if description.is_none() && todos.is_empty() {
        return None;
    }
    let mut result = Map::new();
    result.insert("todos".to_string(), Value::Array(todos));
    if let Some(text) = description {
        result.insert("description".to_string(), json!(text));
    }
    Some(Value::Object(result))
}

fn create_input(input: &Value) -> Value {
    if let Some(path) = input.get("relativeWorkspacePath") {
        return path.clone();
    }
    input.clone()
}

fn update_input(input: &Value) -> Value {
    match input {
        Value::Object(map) => match map.get("relativeWorkspacePath").and_then(Value::as_str) {
            Some(path) => json!(basename(path)),
            None => input.clone(),
        },
        Value::String(s) => json!(basename(s)),
        _ => input.clone(),
    }
}

/// The stored update result is a JSON-encoded envelope; the readable diff
/// lives at `diff.chunks[0].diffString` with doubly-escaped newlines.
fn update_output(output: &Value) -> Value {
    if let Some(raw) = output.as_str()
        && let Ok(parsed) = serde_json::from_str::<Value>(raw)
        && let Some(diff) = parsed
            .pointer("/diff/chunks/0/diffString")
            .and_then(Value::as_str)
        && !diff.is_empty()
    {
        return json!(diff.replace("\\r\\n", "\n").replace("\\n", "\n"));
    }
    json!("")
}
