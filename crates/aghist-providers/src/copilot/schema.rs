//! Serde schema for Copilot chat session files.
//!
//! One JSON document per session. The header fields are stable across
//! versions; each request carries the user turn plus a polymorphic
//! `response` entity stream that is walked as raw JSON.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct SessionFile {
    #[serde(rename = "customTitle", default)]
    pub custom_title: Option<String>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    /// Epoch milliseconds.
    #[serde(rename = "creationDate", default)]
    pub creation_date: Option<f64>,
    #[serde(rename = "responderUsername", default)]
    pub responder_username: Option<String>,
    #[serde(default)]
    pub requests: Vec<SessionRequest>,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub message: Option<RequestMessage>,
    /// Epoch milliseconds; present on newer sessions only.
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(rename = "variableData", default)]
    pub variable_data: Option<VariableData>,
    /// Response entities: plain text chunks, code fence markers,
    /// `toolInvocationSerialized`, `inlineReference`, `undoStop`, and
    /// whatever else the client version emits.
    #[serde(default)]
    pub response: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RequestMessage {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct VariableData {
    #[serde(default)]
    pub variables: Vec<Value>,
}
