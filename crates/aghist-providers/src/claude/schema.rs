//! Transcript line shapes for Claude Code JSONL files.
//!
//! Only the fields the extractor reads are typed; message content stays a
//! raw [`Value`] because user content is a bare string in some sessions
//! and a block array in others.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<TranscriptMessage>,
    /// Richer result payload some CLI versions attach next to the
    /// `tool_result` carrier entry.
    #[serde(rename = "toolUseResult", default)]
    pub tool_use_result: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptMessage {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Value,
}

impl TranscriptEntry {
    pub fn content(&self) -> &Value {
        self.message
            .as_ref()
            .map(|m| &m.content)
            .unwrap_or(&Value::Null)
    }
}
