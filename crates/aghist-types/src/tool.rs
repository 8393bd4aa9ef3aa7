use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Vendor-neutral tool vocabulary.
///
/// Every agent's native tool names collapse into this set before export,
/// so downstream consumers never see `run_terminal_cmd` vs `Bash` vs
/// `run_in_terminal` for what is the same action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalTool {
    /// File/content reads, searches, lints, directory listings
    Read,
    /// In-place edits to an existing file
    Update,
    /// New file creation
    Create,
    /// File deletion
    Delete,
    /// Shell command execution
    Terminal,
    /// Plan/todo management
    Todo,
    /// Web search or fetch
    WebRequest,
}

impl CanonicalTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalTool::Read => "read",
            CanonicalTool::Update => "update",
            CanonicalTool::Create => "create",
            CanonicalTool::Delete => "delete",
            CanonicalTool::Terminal => "terminal",
            CanonicalTool::Todo => "todo",
            CanonicalTool::WebRequest => "web_request",
        }
    }
}

impl fmt::Display for CanonicalTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tool invocation after name mapping and payload shaping.
///
/// `tool_input` and `tool_output` are deliberately loose JSON: the shape
/// depends on the canonical tool (a path list for `read`, a command string
/// for `terminal`, a `{todos, description}` object for `todo`, ...) and is
/// documented per transform at the provider layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedToolCall {
    pub tool_name: CanonicalTool,
    pub tool_input: Value,
    pub tool_output: Value,
}
