//! Canonical shaping for Copilot tool invocations.
//!
//! Copilot records less than the other vendors. Inputs are reassembled
//! upstream from invocation messages (see the parser), and two tools
//! keep their real payload in the output slot: todo lists arrive as
//! `todoList` and terminal commands as `commandLine.original`.

use aghist_types::{CanonicalTool, NormalizedToolCall, Vendor};
use serde_json::{Value, json};

use crate::tool_map::{self, NameMapping, ToolCoverage};
use crate::util::{basename, truthy};

/// Map and shape one invocation into canonical form. Returns None for
/// unmapped names and for todo writes with no usable items.
pub fn normalize_tool_call(
    name: &str,
    input: &Value,
    output: &Value,
    coverage: &mut ToolCoverage,
) -> Option<NormalizedToolCall> {
    let canonical = match tool_map::map_tool_name(Vendor::Copilot, name) {
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
    let tool_input = shape_input(canonical, input, output)?;
    let tool_output = shape_output(canonical, output);
    Some(NormalizedToolCall {
        tool_name: canonical,
        tool_input,
        tool_output,
    })
}

/// Todo and terminal read from the output because that is where Copilot
/// stores their payload.
fn shape_input(tool: CanonicalTool, input: &Value, output: &Value) -> Option<Value> {
    match tool {
        CanonicalTool::Read => Some(read_input(input)),
        CanonicalTool::Terminal => Some(terminal_input(input, output)),
        CanonicalTool::Update => Some(update_input(input)),
        CanonicalTool::Todo => todo_input(input, output),
        CanonicalTool::Create | CanonicalTool::Delete | CanonicalTool::WebRequest => {
            Some(input.clone())
        }
    }
}

/// Only deletions keep their raw output. Everything else Copilot records
/// there is progress prose or data already folded into the input, and an
/// `update` has no before/after text to diff.
fn shape_output(tool: CanonicalTool, output: &Value) -> Value {
    match tool {
        CanonicalTool::Delete => output.clone(),
        _ => json!(""),
    }
}

/// Reads collapse to a file-path list. `files` may arrive as one path or
/// several; `query`-only searches have no resolved files yet.
fn read_input(input: &Value) -> Value {
    match input {
        Value::Object(map) => {
            if let Some(files) = map.get("files") {
                match files {
                    Value::Array(_) => return files.clone(),
                    Value::String(s) if !s.is_empty() => return json!([s]),
                    Value::String(_) => return json!([]),
                    _ => {}
                }
            } else if map.contains_key("query") {
                return json!([]);
            } else if let Some(path) = map.get("file_path") {
                return wrap_if_truthy(path);
            } else if let Some(path) = map.get("relativeWorkspacePath") {
                return wrap_if_truthy(path);
            }
            input.clone()
        }
        Value::String(s) if s.is_empty() => json!([]),
        Value::String(s) => json!([s]),
        _ => input.clone(),
    }
}

fn wrap_if_truthy(value: &Value) -> Value {
    if truthy(value) {
        json!([value.clone()])
    } else {
        json!([])
    }
}

/// The real command line lives in the output's `commandLine.original`.
fn terminal_input(input: &Value, output: &Value) -> Value {
    if truthy(output)
        && let Some(original) = output
            .get("commandLine")
            .and_then(|command| command.get("original"))
            .filter(|v| truthy(v))
    {
        return original.clone();
    }
    input.clone()
}

/// Update inputs shrink to the bare file name; edit text never travels
/// in the input slot.
fn update_input(input: &Value) -> Value {
    match input {
        Value::Object(map) => {
            if let Some(path) = map.get("file_path") {
                if let Some(s) = path.as_str() {
                    return json!(basename(s));
                }
            } else if let Some(path) = map.get("relativeWorkspacePath")
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

/// Todo items normally live in the output's `todoList`; the name key is
/// `title` and `not-started` maps onto `pending`. Sessions that predate
/// that shape carry an `{overview, todos}` input instead. A write with
/// nothing usable drops the whole call.
fn todo_input(input: &Value, output: &Value) -> Option<Value> {
    if truthy(output)
        && let Some(items) = output.get("todoList").and_then(Value::as_array)
        && !items.is_empty()
    {
        let mut todos = Vec::new();
        for item in items {
            let Some(obj) = item.as_object() else { continue };
            let name = obj.get("title").and_then(Value::as_str).unwrap_or("");
            if name.trim().is_empty() {
                continue;
            }
            let mut status = obj
                .get("status")
                .cloned()
                .unwrap_or_else(|| json!("pending"));
            if status.as_str() == Some("not-started") {
                status = json!("pending");
            }
            todos.push(json!({ "name": name, "status": status }));
        }
        if todos.is_empty() {
            return None;
        }
        return Some(json!({ "todos": todos }));
    }

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
    if description.is_none() && todos.is_empty() {
        return None;
    }
    let mut result = json!({ "todos": todos });
    if let Some(description) = description {
        result["description"] = json!(description);
    }
    Some(result)
}
