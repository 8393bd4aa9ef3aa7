//! Plain-text recovery from Cursor's Lexical rich-text documents.

use serde_json::Value;

use crate::util::truthy;

/// Flatten a rich-text payload to plain text.
///
/// Accepts either the document object or its JSON-encoded string form.
/// A string that does not parse as JSON is already plain text and comes
/// back unchanged. The Lexical shape is `{root: {children: [...]}}` with
/// text held in `text` fields one or two levels down; paragraphs are
/// joined with newlines.
pub fn extract_text(value: &Value) -> String {
    let parsed;
    let doc = match value {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(json) => {
                parsed = json;
                &parsed
            }
            Err(_) => return raw.clone(),
        },
        other => other,
    };

    if let Some(root) = doc.get("root").and_then(Value::as_object) {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(children) = root.get("children").and_then(Value::as_array) {
            for child in children {
                if let Some(text) = child.get("text").and_then(Value::as_str)
                    && !text.is_empty()
                {
                    parts.push(text);
                }
                if let Some(nested) = child.get("children").and_then(Value::as_array) {
                    for item in nested {
                        if let Some(text) = item.get("text").and_then(Value::as_str)
                            && !text.is_empty()
                        {
                            parts.push(text);
                        }
                    }
                }
            }
        }
        return parts.join("\n");
    }

    if truthy(doc) { doc.to_string() } else { String::new() }
}
