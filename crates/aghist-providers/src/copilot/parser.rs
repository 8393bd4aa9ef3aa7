//! Parsing Copilot chat session files into export documents.
//!
//! A session file holds the full request/response history. Each request
//! contributes the user turn, then its response entity stream: code
//! fence sequences collapse into `update` invocations, serialized tool
//! invocations go through the copilot transforms, and consecutive text
//! chunks and inline references coalesce into one assistant message.

use std::fs;
use std::path::Path;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

use aghist_core::{
    epoch_to_date, epoch_to_iso_utc, mtime_date, now_iso_utc, timezone_label, today_date,
};
use aghist_types::{
    ChatSummary, ExportDocument, ExportMessage, ExportMetadata, MessageInputs, NormalizedToolCall,
    Role,
};

use super::discovery::{file_id, workspace_id};
use super::schema::{SessionFile, SessionRequest};
use super::tools;
use crate::error::Result;
use crate::tool_map::ToolCoverage;
use crate::util::truthy;

/// Fallback responder when the session names none.
const DEFAULT_RESPONDER: &str = "GitHub Copilot";

/// Synthesized gap between response messages, in milliseconds.
const MESSAGE_INTERVAL_MS: f64 = 15_000.0;

/// Extensions that make a bare invocation-message value look like a file
/// reference.
const PATHY_EXTENSIONS: [&str; 8] = [
    ".py", ".js", ".ts", ".json", ".md", ".txt", ".yaml", ".yml",
];

/// Backtick-quoted fragment of an invocation message, e.g. the glob in
/// "Searching for files matching `**/*.rs`".
static BACKTICK_FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// A path-looking token: a drive-letter path, or an absolute path ending
/// in an extension.
static PATH_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z]:[\\/][^\s`]+|[\\/][^\s`]+\.\w+)").unwrap());

/// Parse one session file. `Ok(None)` when the session yields no
/// messages.
pub fn parse_file(
    path: &Path,
    root: &Path,
    coverage: &mut ToolCoverage,
) -> Result<Option<ExportDocument>> {
    let raw = fs::read_to_string(path)?;
    let session: SessionFile = serde_json::from_str(&raw)?;
    Ok(build_document(&session, path, root, coverage))
}

/// Listing row for one session file; the requests are not walked.
/// Creation date when recorded, file mtime otherwise.
pub fn summarize(path: &Path) -> Option<ChatSummary> {
    let raw = fs::read_to_string(path).ok()?;
    let session: SessionFile = serde_json::from_str(&raw).ok()?;

    let date = match session.creation_date.filter(|ms| *ms != 0.0) {
        Some(ms) => epoch_to_date(ms).unwrap_or_else(today_date),
        None => fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map(mtime_date)
            .unwrap_or_else(|_| today_date()),
    };

    Some(ChatSummary {
        id: file_id(path),
        title: session_title(&session),
        date,
        file_path: path.to_string_lossy().into_owned(),
    })
}

fn build_document(
    session: &SessionFile,
    path: &Path,
    root: &Path,
    coverage: &mut ToolCoverage,
) -> Option<ExportDocument> {
    let metadata = ExportMetadata {
        model: session
            .responder_username
            .clone()
            .unwrap_or_else(|| DEFAULT_RESPONDER.to_string()),
        chat_timezone: timezone_label(),
        project: project_name(&workspace_id(path), root),
    };

    // The synthetic clock starts at the session creation time and is
    // re-anchored by request timestamps when they exist.
    let mut clock = session
        .creation_date
        .filter(|ms| *ms != 0.0)
        .unwrap_or_else(now_ms);
    let mut messages = Vec::new();
    for request in &session.requests {
        push_request(request, &mut clock, &mut messages, coverage);
    }
    if messages.is_empty() {
        return None;
    }

    Some(ExportDocument {
        title: session_title(session),
        metadata,
        created_at: ms_to_iso(session.creation_date.unwrap_or(0.0)),
        messages,
    })
}

fn session_title(session: &SessionFile) -> String {
    if let Some(title) = session
        .custom_title
        .as_deref()
        .filter(|t| !t.is_empty() && *t != "(untitled)")
    {
        return title.to_string();
    }
    let session_id = session.session_id.as_deref().unwrap_or("unknown");
    let stem: String = session_id.chars().take(8).collect();
    format!("Chat {stem}")
}

fn push_request(
    request: &SessionRequest,
    clock: &mut f64,
    messages: &mut Vec<ExportMessage>,
    coverage: &mut ToolCoverage,
) {
    let user_text = request
        .message
        .as_ref()
        .map(|m| m.text.as_str())
        .unwrap_or("");
    if !user_text.is_empty() {
        if let Some(ts) = request.timestamp.filter(|t| *t != 0.0) {
            *clock = ts;
        }
        let mut message = ExportMessage::text(Role::User, user_text, ms_to_iso(*clock));
        message.inputs = attachment_inputs(request);
        messages.push(message);
    }
    push_response_entities(&request.response, clock, messages, coverage);
}

/// `file`-kind request variables become `inputs.attachment`: one path
/// stays a bare string, several become a list.
fn attachment_inputs(request: &SessionRequest) -> Option<MessageInputs> {
    let variables = request.variable_data.as_ref()?.variables.as_slice();
    let mut attachments = Vec::new();
    for variable in variables {
        if variable.get("kind").and_then(Value::as_str) != Some("file") {
            continue;
        }
        let Some(value) = variable.get("value").and_then(Value::as_object) else {
            continue;
        };
        let path = value
            .get("fsPath")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                value
                    .get("path")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            });
        if let Some(path) = path {
            attachments.push(path.to_string());
        }
    }
    match attachments.len() {
        0 => None,
        1 => Some(MessageInputs {
            attachment: json!(attachments[0]),
        }),
        _ => Some(MessageInputs {
            attachment: json!(attachments),
        }),
    }
}

/// Walk one response's entity stream in order. Every kind that is not a
/// tool invocation, an inline reference, or an undo marker is skipped.
fn push_response_entities(
    entities: &[Value],
    clock: &mut f64,
    messages: &mut Vec<ExportMessage>,
    coverage: &mut ToolCoverage,
) {
    let mut i = 0;
    while i < entities.len() {
        let entity = &entities[i];

        if is_code_marker(entity) {
            let (block, next) = collect_code_block(entities, i + 1);
            i = next;
            if let Some(call) = block.into_call(coverage) {
                *clock += MESSAGE_INTERVAL_MS;
                messages.push(ExportMessage::tool(Role::Assistant, call, ms_to_iso(*clock)));
            }
            continue;
        }

        if let Some(kind) = entity.get("kind") {
            if kind == "toolInvocationSerialized"
                && let Some(tool_id) = entity
                    .get("toolId")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
            {
                let output = extract_tool_output(entity);
                let input = extract_tool_input(entity, tool_id);
                if let Some(call) = tools::normalize_tool_call(tool_id, &input, &output, coverage) {
                    *clock += MESSAGE_INTERVAL_MS;
                    messages.push(ExportMessage::tool(Role::Assistant, call, ms_to_iso(*clock)));
                }
            }
            i += 1;
            continue;
        }

        if entity.get("value").is_some() {
            let (text, next) = collect_text_run(entities, i);
            // A fence wrapped in an object value breaks the run without
            // consuming anything; step over it instead of re-reading it.
            i = if next > i { next } else { i + 1 };
            if !text.is_empty() {
                *clock += MESSAGE_INTERVAL_MS;
                messages.push(ExportMessage::text(Role::Assistant, text, ms_to_iso(*clock)));
            }
            continue;
        }

        i += 1;
    }
}

/// A bare code fence chunk: a string `value` containing ``` with no
/// `kind` discriminator.
fn is_code_marker(entity: &Value) -> bool {
    entity.get("kind").is_none()
        && entity
            .get("value")
            .and_then(Value::as_str)
            .is_some_and(|s| s.contains("```"))
}

struct CodeBlock {
    file_path: Option<String>,
    content: Option<String>,
}

impl CodeBlock {
    /// The collapsed block becomes an `update` keyed by the edited file.
    /// Blocks with neither a path nor text produce nothing.
    fn into_call(self, coverage: &mut ToolCoverage) -> Option<NormalizedToolCall> {
        let has_content = self.content.as_deref().is_some_and(|c| !c.is_empty());
        if !has_content && self.file_path.is_none() {
            return None;
        }
        let mut input = serde_json::Map::new();
        if let Some(path) = self.file_path {
            input.insert("file_path".to_string(), json!(path));
        }
        let output = json!(self.content.unwrap_or_default());
        tools::normalize_tool_call("codeBlock", &Value::Object(input), &output, coverage)
    }
}

/// Gather everything between an opening fence and the closing one: the
/// edited file from `codeblockUri` and the text of the first
/// `textEditGroup` edit.
fn collect_code_block(entities: &[Value], start: usize) -> (CodeBlock, usize) {
    let mut block = CodeBlock {
        file_path: None,
        content: None,
    };
    let mut i = start;
    while i < entities.len() {
        let entity = &entities[i];
        if is_code_marker(entity) {
            i += 1;
            break;
        }
        match entity.get("kind").and_then(Value::as_str) {
            Some("codeblockUri") => {
                if let Some(uri) = entity.get("uri").and_then(Value::as_object) {
                    block.file_path = uri
                        .get("fsPath")
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .or_else(|| uri.get("path").and_then(Value::as_str))
                        .filter(|s| !s.is_empty())
                        .map(str::to_string);
                }
            }
            Some("textEditGroup") => {
                if let Some(edit) = entity
                    .get("edits")
                    .and_then(Value::as_array)
                    .and_then(|groups| groups.first())
                    .and_then(Value::as_array)
                    .and_then(|edits| edits.first())
                    .and_then(Value::as_object)
                {
                    block.content = Some(
                        edit.get("text")
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_string(),
                    );
                }
            }
            _ => {}
        }
        i += 1;
    }
    (block, i)
}

/// Concatenate a run of plain text chunks and inline references,
/// stopping at fences, tool entities, or anything else that breaks the
/// flow. `undoStop` markers are transparent.
fn collect_text_run(entities: &[Value], start: usize) -> (String, usize) {
    let mut text = String::new();
    let mut j = start;
    while j < entities.len() {
        let entity = &entities[j];
        if entity.get("kind").is_none() {
            let Some(value) = entity.get("value") else {
                break;
            };
            let chunk = text_of(value);
            if chunk.contains("```") {
                break;
            }
            text.push_str(&chunk);
            j += 1;
            continue;
        }
        match entity.get("kind").and_then(Value::as_str) {
            Some("inlineReference") => {
                if let Some(reference) = entity.get("inlineReference").filter(|r| truthy(r)) {
                    text.push_str(&reference_markdown(reference));
                }
                j += 1;
            }
            Some("undoStop") => j += 1,
            _ => break,
        }
    }
    (text, j)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("value")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        _ => String::new(),
    }
}

/// Inline references render as backtick-quoted paths, or names when no
/// path is recorded.
fn reference_markdown(reference: &Value) -> String {
    if let Some(path) = reference_path(reference) {
        return format!("`{path}`");
    }
    if let Some(name) = reference
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return format!("`{name}`");
    }
    String::new()
}

fn reference_path(reference: &Value) -> Option<&str> {
    let direct = reference
        .get("fsPath")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            reference
                .get("path")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        });
    if direct.is_some() {
        return direct;
    }
    let uri = reference.get("location")?.get("uri")?;
    uri.get("fsPath")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            uri.get("path")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
}

/// Reassemble a tool input from the invocation record: the invocation
/// message first (search pattern, uri list, path-looking fragments),
/// then `resultDetails`, then `toolSpecificData` for reads that still
/// came up empty.
fn extract_tool_input(invocation: &Value, tool_id: &str) -> Value {
    let mut input = serde_json::Map::new();

    if let Some(message) = invocation
        .get("invocationMessage")
        .and_then(Value::as_object)
    {
        let value = message.get("value").and_then(Value::as_str).unwrap_or("");

        if tool_id == "copilot_findFiles" && !value.is_empty() {
            let query = BACKTICK_FRAGMENT
                .captures(value)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .unwrap_or(value);
            input.insert("query".to_string(), json!(query));
        }

        if let Some(uris) = message.get("uris").and_then(Value::as_object) {
            let paths = object_paths(uris.values());
            if !paths.is_empty() {
                input.insert("files".to_string(), single_or_list(paths));
            }
        }

        if tool_id == "copilot_readFile" && !value.is_empty() && looks_like_path(value) {
            let file = PATH_TOKEN
                .captures(value)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .unwrap_or(value);
            input.insert("files".to_string(), json!([file]));
        }
    }

    if let Some(details) = invocation.get("resultDetails").and_then(Value::as_array) {
        let paths = object_paths(details.iter());
        if !paths.is_empty() && !input.contains_key("files") {
            input.insert("files".to_string(), single_or_list(paths));
        }
    }

    if matches!(tool_id, "copilot_readFile" | "copilot_getErrors")
        && input.is_empty()
        && let Some(specific) = invocation.get("toolSpecificData").and_then(Value::as_object)
    {
        if let Some(file) = specific.get("file") {
            if truthy(file) {
                input.insert("files".to_string(), wrap_str(file));
            }
        } else if let Some(file) = specific.get("path")
            && truthy(file)
        {
            input.insert("files".to_string(), wrap_str(file));
        }
    }

    Value::Object(input)
}

fn looks_like_path(value: &str) -> bool {
    value.contains('/')
        || value.contains('\\')
        || PATHY_EXTENSIONS.iter().any(|ext| value.ends_with(ext))
}

/// Collect `fsPath`/`path` strings from uri-shaped objects.
fn object_paths<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<String> {
    let mut paths = Vec::new();
    for value in values {
        let Some(obj) = value.as_object() else { continue };
        let path = obj
            .get("fsPath")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                obj.get("path")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            });
        if let Some(path) = path {
            paths.push(path.to_string());
        }
    }
    paths
}

/// One path stays a bare string; several become a list.
fn single_or_list(mut paths: Vec<String>) -> Value {
    if paths.len() == 1 {
        json!(paths.remove(0))
    } else {
        json!(paths)
    }
}

fn wrap_str(value: &Value) -> Value {
    match value.as_str() {
        Some(s) => json!([s]),
        None => value.clone(),
    }
}

/// Tool output slot: `toolSpecificData` wins when present, else the
/// past-tense or invocation message text.
fn extract_tool_output(invocation: &Value) -> Value {
    if let Some(specific) = invocation.get("toolSpecificData") {
        return specific.clone();
    }
    match invocation.get("pastTenseMessage") {
        Some(Value::Object(map)) => {
            return map.get("value").cloned().unwrap_or_else(|| json!(""));
        }
        Some(Value::String(s)) => return json!(s),
        _ => {}
    }
    match invocation.get("invocationMessage") {
        Some(Value::String(s)) => json!(s),
        Some(Value::Object(map)) => map.get("value").cloned().unwrap_or_else(|| json!("")),
        _ => json!(""),
    }
}

/// Project display name for a workspace-storage hash: the last component
/// of the folder path recorded in its `workspace.json`.
pub(crate) fn project_name(ws_id: &str, root: &Path) -> String {
    let manifest = root.join(ws_id).join("workspace.json");
    let folder = fs::read_to_string(&manifest)
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .as_ref()
        .and_then(workspace_folder);
    match folder {
        Some(folder) => Path::new(&folder)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        None => "Unknown Project".to_string(),
    }
}

/// First folder path in a `workspace.json` value tree: `file://` URIs
/// stripped of their scheme, or bare absolute (POSIX or drive-letter)
/// paths.
fn workspace_folder(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            if let Some(rest) = s.strip_prefix("file://") {
                return Some(rest.to_string());
            }
            if s.starts_with('/') || s.chars().nth(1) == Some(':') {
                return Some(s.clone());
            }
            None
        }
        Value::Object(map) => map.values().find_map(workspace_folder),
        Value::Array(items) => items.iter().find_map(workspace_folder),
        _ => None,
    }
}

/// Milliseconds to ISO UTC; zero and unrepresentable values fall back to
/// the current instant.
fn ms_to_iso(ms: f64) -> String {
    if ms == 0.0 {
        return now_iso_utc();
    }
    epoch_to_iso_utc(ms).unwrap_or_else(now_iso_utc)
}

fn now_ms() -> f64 {
    Utc::now().timestamp_millis() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use aghist_types::{CanonicalTool, MessageContent, MessageKind};
    use std::fs;
    use std::path::PathBuf;

    fn write_session(root: &Path, ws_id: &str, name: &str, session: &Value) -> PathBuf {
        let dir = root.join(ws_id).join("chatSessions");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string(session).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_full_session_transforms_in_order() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("ws1")).unwrap();
        fs::write(
            root.path().join("ws1").join("workspace.json"),
            r#"{"folder": "file:///home/dev/aghist"}"#,
        )
        .unwrap();

        let session = json!({
            "sessionId": "9f2c1a77-55d0-4b31",
            "creationDate": 1736935200000u64,
            "responderUsername": "GitHub Copilot",
            "requests": [{
                "message": {"text": "Where does parsing happen?"},
                "timestamp": 1736935210000u64,
                "variableData": {"variables": [
                    {"kind": "file", "value": {"fsPath": "/home/dev/aghist/README.md"}},
                    {"kind": "selection", "value": {"fsPath": "/ignored"}}
                ]},
                "response": [
                    {"value": "The parser lives in "},
                    {"kind": "inlineReference", "inlineReference": {"fsPath": "/home/dev/aghist/src/parser.rs"}},
                    {"value": " and needs a fix."},
                    {"kind": "undoStop", "id": "u1"},
                    {"value": " Read on."},
                    {"kind": "toolInvocationSerialized", "toolId": "copilot_findFiles",
                     "invocationMessage": {"value": "Searching for files matching `**/*.rs`"},
                     "resultDetails": [
                        {"fsPath": "/home/dev/aghist/src/lib.rs"},
                        {"path": "/home/dev/aghist/src/main.rs"}
                     ]},
                    {"value": "```rust"},
                    {"kind": "codeblockUri", "uri": {"fsPath": "/home/dev/aghist/src/parser.rs"}},
                    {"kind": "textEditGroup", "edits": [[{"text": "fn parse() {}"}]]},
                    {"value": "```"}
                ]
            }]
        });
        let path = write_session(root.path(), "ws1", "session.json", &session);

        let mut coverage = ToolCoverage::default();
        let doc = parse_file(&path, root.path(), &mut coverage)
            .unwrap()
            .unwrap();

        assert_eq!(doc.title, "Chat 9f2c1a77");
        assert_eq!(doc.created_at, "2025-01-15T10:00:00Z");
        assert_eq!(doc.metadata.model, "GitHub Copilot");
        assert_eq!(doc.metadata.project, "aghist");
        assert!(coverage.is_empty());

        assert_eq!(doc.messages.len(), 4);

        let user = &doc.messages[0];
        assert_eq!(user.role, Role::User);
        assert_eq!(user.timestamp, "2025-01-15T10:00:10Z");
        assert_eq!(
            user.inputs.as_ref().unwrap().attachment,
            json!("/home/dev/aghist/README.md")
        );

        let prose = &doc.messages[1];
        assert_eq!(prose.kind, MessageKind::Text);
        assert_eq!(prose.timestamp, "2025-01-15T10:00:25Z");
        assert_eq!(
            prose.content,
            MessageContent::Text(
                "The parser lives in `/home/dev/aghist/src/parser.rs` and needs a fix. Read on."
                    .to_string()
            )
        );

        let search = &doc.messages[2];
        assert_eq!(search.timestamp, "2025-01-15T10:00:40Z");
        let MessageContent::Tool(call) = &search.content else {
            panic!("expected tool content");
        };
        assert_eq!(call.tool_name, CanonicalTool::Read);
        assert_eq!(
            call.tool_input,
            json!(["/home/dev/aghist/src/lib.rs", "/home/dev/aghist/src/main.rs"])
        );

        let edit = &doc.messages[3];
        assert_eq!(edit.timestamp, "2025-01-15T10:00:55Z");
        let MessageContent::Tool(call) = &edit.content else {
            panic!("expected tool content");
        };
        assert_eq!(call.tool_name, CanonicalTool::Update);
        assert_eq!(call.tool_input, json!("parser.rs"));
        assert_eq!(call.tool_output, json!(""));
    }

    #[test]
    fn test_session_without_messages_is_none() {
        let root = tempfile::tempdir().unwrap();
        let session = json!({
            "sessionId": "empty-session",
            "creationDate": 1736935200000u64,
            "requests": [{
                "message": {"text": ""},
                "response": [{"kind": "progressTaskSerialized", "task": {}}]
            }]
        });
        let path = write_session(root.path(), "ws1", "empty.json", &session);

        let mut coverage = ToolCoverage::default();
        assert!(
            parse_file(&path, root.path(), &mut coverage)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_text_runs_break_at_code_fences() {
        let entities = vec![
            json!({"value": "Before the edit:"}),
            json!({"value": "```"}),
            json!({"kind": "codeblockUri", "uri": {"path": "/w/src/lib.rs"}}),
            json!({"kind": "textEditGroup", "edits": [[{"text": "pub mod parser;"}]]}),
            json!({"value": "```"}),
            json!({"value": "All done."}),
        ];
        let mut clock = 1_736_935_200_000.0;
        let mut messages = Vec::new();
        let mut coverage = ToolCoverage::default();
        push_response_entities(&entities, &mut clock, &mut messages, &mut coverage);

        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[0].content,
            MessageContent::Text("Before the edit:".to_string())
        );
        assert_eq!(messages[1].kind, MessageKind::Tool);
        assert_eq!(
            messages[2].content,
            MessageContent::Text("All done.".to_string())
        );
    }

    #[test]
    fn test_unclosed_code_block_consumes_rest() {
        let entities = vec![
            json!({"value": "```python"}),
            json!({"kind": "textEditGroup", "edits": [[{"text": "print('hi')"}]]}),
        ];
        let mut clock = 1_736_935_200_000.0;
        let mut messages = Vec::new();
        let mut coverage = ToolCoverage::default();
        push_response_entities(&entities, &mut clock, &mut messages, &mut coverage);

        assert_eq!(messages.len(), 1);
        let MessageContent::Tool(call) = &messages[0].content else {
            panic!("expected tool content");
        };
        // No codeblockUri, so the update input passes through unchanged.
        assert_eq!(call.tool_name, CanonicalTool::Update);
        assert_eq!(call.tool_input, json!({}));
    }

    #[test]
    fn test_wrapped_fence_is_skipped_not_looped() {
        let entities = vec![
            json!({"value": {"value": "```"}}),
            json!({"value": "after the fence"}),
        ];
        let mut clock = 1_736_935_200_000.0;
        let mut messages = Vec::new();
        let mut coverage = ToolCoverage::default();
        push_response_entities(&entities, &mut clock, &mut messages, &mut coverage);

        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].content,
            MessageContent::Text("after the fence".to_string())
        );
    }

    #[test]
    fn test_reference_markdown_falls_back_to_location_and_name() {
        let by_location = json!({"location": {"uri": {"path": "/w/src/main.rs"}}});
        assert_eq!(reference_markdown(&by_location), "`/w/src/main.rs`");

        let by_name = json!({"name": "main.rs"});
        assert_eq!(reference_markdown(&by_name), "`main.rs`");

        assert_eq!(reference_markdown(&json!({"other": 1})), "");
    }

    #[test]
    fn test_find_files_query_from_backticks() {
        let invocation = json!({
            "invocationMessage": {"value": "Searching for files matching `**/*.{py,md}`"}
        });
        let input = extract_tool_input(&invocation, "copilot_findFiles");
        assert_eq!(input, json!({"query": "**/*.{py,md}"}));

        let plain = json!({"invocationMessage": {"value": "Searching the workspace"}});
        let input = extract_tool_input(&plain, "copilot_findFiles");
        assert_eq!(input, json!({"query": "Searching the workspace"}));
    }

    #[test]
    fn test_read_file_path_token_heuristic() {
        let invocation = json!({
            "invocationMessage": {"value": "Reading /home/dev/app/config.yaml now"}
        });
        let input = extract_tool_input(&invocation, "copilot_readFile");
        assert_eq!(input, json!({"files": ["/home/dev/app/config.yaml"]}));

        // Ends with a known extension but no extractable token: the whole
        // value is taken as the path.
        let bare = json!({"invocationMessage": {"value": "notes.md"}});
        let input = extract_tool_input(&bare, "copilot_readFile");
        assert_eq!(input, json!({"files": ["notes.md"]}));
    }

    #[test]
    fn test_uris_win_over_result_details() {
        let invocation = json!({
            "invocationMessage": {
                "value": "Reading files",
                "uris": {"0": {"fsPath": "/w/a.rs"}}
            },
            "resultDetails": [{"fsPath": "/w/b.rs"}, {"fsPath": "/w/c.rs"}]
        });
        let input = extract_tool_input(&invocation, "copilot_findTextInFiles");
        assert_eq!(input, json!({"files": "/w/a.rs"}));
    }

    #[test]
    fn test_tool_specific_data_backfills_empty_reads() {
        let invocation = json!({
            "toolSpecificData": {"file": "/w/lib.py"}
        });
        let input = extract_tool_input(&invocation, "copilot_getErrors");
        assert_eq!(input, json!({"files": ["/w/lib.py"]}));

        // Other tools never reach into toolSpecificData.
        let input = extract_tool_input(&invocation, "copilot_findTextInFiles");
        assert_eq!(input, json!({}));
    }

    #[test]
    fn test_output_preference_order() {
        let with_specific = json!({
            "toolSpecificData": {"commandLine": {"original": "ls"}},
            "pastTenseMessage": {"value": "Ran command"}
        });
        assert_eq!(
            extract_tool_output(&with_specific),
            json!({"commandLine": {"original": "ls"}})
        );

        let with_past = json!({
            "pastTenseMessage": "Read 3 files",
            "invocationMessage": {"value": "Reading files"}
        });
        assert_eq!(extract_tool_output(&with_past), json!("Read 3 files"));

        let message_only = json!({"invocationMessage": {"value": "Reading files"}});
        assert_eq!(extract_tool_output(&message_only), json!("Reading files"));

        assert_eq!(extract_tool_output(&json!({})), json!(""));
    }

    #[test]
    fn test_project_name_from_workspace_json() {
        let root = tempfile::tempdir().unwrap();
        let ws = root.path().join("ws1");
        fs::create_dir_all(&ws).unwrap();
        fs::write(
            ws.join("workspace.json"),
            r#"{"folder": "file:///home/dev/cursor-view"}"#,
        )
        .unwrap();

        assert_eq!(project_name("ws1", root.path()), "cursor-view");
        assert_eq!(project_name("missing", root.path()), "Unknown Project");

        let bad = root.path().join("ws2");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("workspace.json"), "not json").unwrap();
        assert_eq!(project_name("ws2", root.path()), "Unknown Project");
    }

    #[test]
    fn test_workspace_folder_accepts_bare_and_nested_paths() {
        let nested = json!({"settings": {"paths": ["relative", "/abs/proj"]}});
        assert_eq!(workspace_folder(&nested).as_deref(), Some("/abs/proj"));

        let drive = json!("C:\\Users\\dev\\proj");
        assert_eq!(
            workspace_folder(&drive).as_deref(),
            Some("C:\\Users\\dev\\proj")
        );

        assert_eq!(workspace_folder(&json!("not-a-path")), None);
    }

    #[test]
    fn test_summarize_uses_creation_date_then_mtime() {
        let root = tempfile::tempdir().unwrap();
        let dated = write_session(
            root.path(),
            "ws1",
            "dated.json",
            &json!({"sessionId": "s1", "creationDate": 1736935200000u64}),
        );
        let summary = summarize(&dated).unwrap();
        assert_eq!(summary.date, "2025-01-15");
        assert_eq!(summary.title, "Chat s1");

        let undated = write_session(root.path(), "ws1", "undated.json", &json!({"sessionId": "s2"}));
        let mtime = fs::metadata(&undated).unwrap().modified().unwrap();
        let summary = summarize(&undated).unwrap();
        assert_eq!(summary.date, mtime_date(mtime));
    }

    #[test]
    fn test_summarize_skips_unparseable_files() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("ws1").join("chatSessions");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{truncated").unwrap();
        assert!(summarize(&path).is_none());
    }

    #[test]
    fn test_title_prefers_custom_over_session_id() {
        let session = json!({"customTitle": "Refactor exporter", "sessionId": "abc"});
        let path_root = tempfile::tempdir().unwrap();
        let path = write_session(path_root.path(), "ws1", "t.json", &session);
        assert_eq!(summarize(&path).unwrap().title, "Refactor exporter");

        let untitled = json!({"customTitle": "(untitled)", "sessionId": "abcdef123456"});
        let path = write_session(path_root.path(), "ws1", "u.json", &untitled);
        assert_eq!(summarize(&path).unwrap().title, "Chat abcdef12");
    }

    #[test]
    fn test_attachments_single_and_list() {
        let single: SessionRequest = serde_json::from_value(json!({
            "variableData": {"variables": [
                {"kind": "file", "value": {"path": "/w/a.md"}}
            ]}
        }))
        .unwrap();
        assert_eq!(
            attachment_inputs(&single).unwrap().attachment,
            json!("/w/a.md")
        );

        let multiple: SessionRequest = serde_json::from_value(json!({
            "variableData": {"variables": [
                {"kind": "file", "value": {"fsPath": "/w/a.md"}},
                {"kind": "file", "value": {"fsPath": "/w/b.md"}}
            ]}
        }))
        .unwrap();
        assert_eq!(
            attachment_inputs(&multiple).unwrap().attachment,
            json!(["/w/a.md", "/w/b.md"])
        );

        let none: SessionRequest = serde_json::from_value(json!({})).unwrap();
        assert!(attachment_inputs(&none).is_none());
    }

    #[test]
    fn test_clock_advances_without_request_timestamps() {
        let root = tempfile::tempdir().unwrap();
        let session = json!({
            "sessionId": "s1",
            "creationDate": 1736935200000u64,
            "requests": [{
                "message": {"text": "hi"},
                "response": [{"value": "hello"}]
            }]
        });
        let path = write_session(root.path(), "ws1", "s.json", &session);

        let mut coverage = ToolCoverage::default();
        let doc = parse_file(&path, root.path(), &mut coverage)
            .unwrap()
            .unwrap();

        // No request timestamp: the user message sits on the creation
        // instant and the response steps forward from it.
        assert_eq!(doc.messages[0].timestamp, "2025-01-15T10:00:00Z");
        assert_eq!(doc.messages[1].timestamp, "2025-01-15T10:00:15Z");
    }
}
