use aghist_types::Role;
use serde_json::Value;

/// A tool invocation exactly as a store recorded it, before any name
/// mapping or payload shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawToolCall {
    pub name: String,
    pub input: Value,
    pub output: Value,
}

/// One message-bearing row recovered from a store, keyed by the
/// conversation it belongs to. A record can carry text, a tool call, or
/// both; the reconciler splits it into separate messages.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub conversation_key: String,
    pub role: Role,
    pub text: String,
    pub tool_call: Option<RawToolCall>,
    pub timestamp: Option<f64>,
}

/// Role from whichever discriminant a store uses: the integer `1` and the
/// string `"user"` both mean user, everything else is the assistant.
pub fn role_from_discriminant(value: &Value) -> Role {
    let is_user = match value {
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "user",
        _ => false,
    };
    if is_user { Role::User } else { Role::Assistant }
}
