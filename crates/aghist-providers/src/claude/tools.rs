//! Canonical shaping for Claude Code tool invocations.

use aghist_types::{CanonicalTool, NormalizedToolCall, Vendor};
use serde_json::{Value, json};

use crate::tool_map::{self, NameMapping, ToolCoverage};
use crate::util::{basename, truthy};

/// Map and shape one `tool_use` block (with its paired result) into
/// canonical form. Returns None for unmapped names and for todo writes
/// that carry no usable items.
pub fn normalize_tool_call(
    name: &str,
    input: &Value,
    output: &Value,
    coverage: &mut ToolCoverage,
) -> Option<NormalizedToolCall> {
    let canonical = match tool_map::map_tool_name(Vendor::Claude, name) {
        NameMapping::Canonical(tool) => tool,
        NameMapping::Skip => {
            coverage.record_skip(name);
            return None;
        }
        NameMapping::Unknown => {
            coverage.record_unknown(name);
            return None;
        }
    };
    let tool_input = shape_input(canonical, input)?;
    let tool_output = shape_output(canonical, input, output);
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
        CanonicalTool::Create => Some(file_name_input(input)),
        CanonicalTool::Update => Some(file_name_input(input)),
        CanonicalTool::Delete => Some(input.clone()),
    }
}

fn shape_output(tool: CanonicalTool, input: &Value, output: &Value) -> Value {
    match tool {
        CanonicalTool::Read => read_output(input, output),
        CanonicalTool::Todo => todo_output(output),
        CanonicalTool::Create => create_output(input),
        CanonicalTool::Update => update_output(input),
        CanonicalTool::Delete => output.clone(),
        CanonicalTool::Terminal | CanonicalTool::WebRequest => json!(""),
    }
}

/// `{prompt, url?}` becomes `{request, url?}`; a bare string is the
/// request itself. Anything else passes through.
fn web_request_input(input: &Value) -> Value {
    let mut result = serde_json::Map::new();
    match input {
        Value::Object(map) => {
            if let Some(prompt) = map.get("prompt") {
                result.insert("request".to_string(), prompt.clone());
            }
            if let Some(url) = map.get("url") {
                result.insert("url".to_string(), url.clone());
            }
        }
        Value::String(s) => {
            result.insert("request".to_string(), Value::String(s.clone()));
        }
        _ => {}
    }
    if result.contains_key("request") {
        Value::Object(result)
    } else {
        input.clone()
    }
}

/// Reads collapse to a file-path list. Grep/Glob inputs keep the bare
/// pattern so the matched-file output (see [`read_output`]) has context.
fn read_input(input: &Value) -> Value {
    match input {
        Value::Object(map) => {
            if let Some(path) = map.get("file_path") {
                wrap_path(path)
            } else if let Some(path) = map.get("targetFile") {
                wrap_path(path)
            } else if let Some(pattern) = map.get("pattern") {
                if truthy(pattern) {
                    pattern.clone()
                } else {
                    json!([])
                }
            } else if map.is_empty() {
                json!([])
            } else {
                input.clone()
            }
        }
        Value::String(s) if s.is_empty() => json!([]),
        Value::String(s) => json!([s]),
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
    if let Some(command) = input.get("command").and_then(Value::as_str) {
        return json!(command);
    }
    input.clone()
}

/// Todo items keep `{name, status}` only; blank-named items are dropped
/// and a write with nothing left drops the whole call.
fn todo_input(input: &Value) -> Option<Value> {
    let Value::Object(map) = input else {
        if input.is_null() {
            return None;
        }
        return Some(input.clone());
    };
    let mut todos = Vec::new();
    if let Some(items) = map.get("todos").and_then(Value::as_array) {
        for item in items {
            let Some(obj) = item.as_object() else { continue };
            let name = obj.get("content").and_then(Value::as_str).unwrap_or("");
            if name.trim().is_empty() {
                continue;
            }
            let status = obj
                .get("status")
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            todos.push(json!({ "name": name, "status": status }));
        }
    }
    if todos.is_empty() {
        return None;
    }
    Some(json!({ "todos": todos }))
}

/// Create/update inputs shrink to the bare file name; the content or
/// edit strings never travel in the input slot.
fn file_name_input(input: &Value) -> Value {
    match input {
        Value::Object(map) => {
            if let Some(path) = map.get("file_path") {
                if let Some(s) = path.as_str() {
                    return json!(basename(s));
                }
            } else if let Some(path) = map.get("path")
                && let Some(s) = path.as_str()
            {
                return json!(basename(s));
            }
            input.clone()
        }
        Value::String(s) => json!(basename(s)),
        _ => input.clone(),
    }
}

/// Plain reads suppress their output. Pattern searches instead keep the
/// matched-file list, recovered from whichever shape the result took: a
/// bare list, a `files`/`paths`/`results` mapping, a JSON-encoded
/// string, or newline-separated lines.
fn read_output(input: &Value, output: &Value) -> Value {
    if truthy(input) {
        let is_pattern = match input {
            Value::Object(map) => map.contains_key("pattern"),
            Value::String(s) => s.contains('*') || s.contains('?'),
            _ => false,
        };
        if is_pattern
            && truthy(output)
            && let Some(files) = pattern_file_list(output)
        {
            return files;
        }
    }
    json!("")
}

fn pattern_file_list(output: &Value) -> Option<Value> {
    match output {
        Value::Array(_) => Some(output.clone()),
        Value::Object(map) => {
            if let Some(files) = map.get("files") {
                return Some(list_or_wrap(files));
            }
            if let Some(paths) = map.get("paths") {
                return Some(list_or_wrap(paths));
            }
            if let Some(results) = map.get("results").and_then(Value::as_array) {
                let mut found = Vec::new();
                for result in results {
                    match result {
                        Value::Object(obj) => {
                            if let Some(path) = obj.get("path") {
                                found.push(path.clone());
                            } else if let Some(file) = obj.get("file") {
                                found.push(file.clone());
                            } else if let Some(path) = obj.get("file_path") {
                                found.push(path.clone());
                            }
                        }
                        Value::String(_) => found.push(result.clone()),
                        _ => {}
                    }
                }
                return Some(Value::Array(found));
            }
            None
        }
        Value::String(s) if !s.trim().is_empty() => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => Some(Value::Array(items)),
            Ok(Value::Object(map)) => map.get("files").map(list_or_wrap),
            Ok(_) => None,
            Err(_) => {
                let lines: Vec<&str> = s
                    .split('\n')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect();
                if lines.is_empty() { None } else { Some(json!(lines)) }
            }
        },
        _ => None,
    }
}

fn list_or_wrap(value: &Value) -> Value {
    match value {
        Value::Array(_) => value.clone(),
        other if truthy(other) => json!([other.clone()]),
        _ => json!([]),
    }
}

/// TodoWrite acknowledgements arrive as text-block lists; join them.
fn todo_output(output: &Value) -> Value {
    if let Value::Array(items) = output {
        let mut parts = Vec::new();
        for item in items {
            match item {
                Value::Object(obj) => {
                    if let Some(text) = obj.get("text").and_then(Value::as_str) {
                        parts.push(text.to_string());
                    }
                }
                Value::String(s) => parts.push(s.clone()),
                _ => {}
            }
        }
        if !parts.is_empty() {
            return json!(parts.join("\n"));
        }
    }
    output.clone()
}

/// The created file's name, taken from the input; the write result
/// itself is noise.
fn create_output(input: &Value) -> Value {
    if truthy(input) {
        match input {
            Value::Object(map) => {
                if let Some(path) = map.get("file_path") {
                    if let Some(s) = path.as_str() {
                        return json!(basename(s));
                    }
                } else if let Some(path) = map.get("path")
                    && let Some(s) = path.as_str()
                {
                    return json!(basename(s));
                }
            }
            Value::String(s) => return json!(basename(s)),
            _ => {}
        }
    }
    json!("")
}

/// Edits carry both text snapshots, so the output becomes a line diff.
fn update_output(input: &Value) -> Value {
    if let Value::Object(map) = input
        && let Some(old) = map.get("old_string").and_then(Value::as_str)
        && let Some(new) = map.get("new_string").and_then(Value::as_str)
    {
        return json!(aghist_core::line_diff(old, new));
    }
    json!("")
}
