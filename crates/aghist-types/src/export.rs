use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tool::NormalizedToolCall;

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Message payload discriminator, serialized as the wire field `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Tool,
}

/// Message body: plain text or one normalized tool invocation.
///
/// Untagged on purpose. The wire format carries the discriminator in the
/// sibling `type` field, so the body is either a bare string or the tool
/// call object with no extra wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Tool(NormalizedToolCall),
}

/// Extra user-message context (Copilot file attachments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInputs {
    /// A single path (string) or several (array of strings).
    pub attachment: Value,
}

/// One message in an export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMessage {
    pub role: Role,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: MessageContent,
    /// ISO-8601 UTC with `Z` suffix.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<MessageInputs>,
}

impl ExportMessage {
    pub fn text(role: Role, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            role,
            kind: MessageKind::Text,
            content: MessageContent::Text(content.into()),
            timestamp: timestamp.into(),
            inputs: None,
        }
    }

    pub fn tool(role: Role, call: NormalizedToolCall, timestamp: impl Into<String>) -> Self {
        Self {
            role,
            kind: MessageKind::Tool,
            content: MessageContent::Tool(call),
            timestamp: timestamp.into(),
            inputs: None,
        }
    }
}

/// Document-level metadata.
///
/// `Project` keeps its capitalized wire name; existing consumers of the
/// export format already key on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub model: String,
    pub chat_timezone: String,
    #[serde(rename = "Project")]
    pub project: String,
}

/// The vendor-neutral export document, one per conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub title: String,
    pub metadata: ExportMetadata,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub messages: Vec<ExportMessage>,
}

/// Lightweight listing entry: enough to print a row and re-find the chat,
/// produced without parsing full conversation content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Stable 16-hex-char chat ID.
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Backing store: a database path for Cursor, a session file otherwise.
    pub file_path: String,
}
