use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chat history source, by the product that wrote the files on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Cursor IDE (SQLite workspace/global state databases)
    Cursor,
    /// Claude Code (JSONL transcripts under ~/.claude/projects)
    Claude,
    /// GitHub Copilot Chat in VS Code (JSON session files)
    Copilot,
}

impl Vendor {
    pub const ALL: [Vendor; 3] = [Vendor::Cursor, Vendor::Claude, Vendor::Copilot];

    /// Stable lowercase identifier. Doubles as the chat ID namespace,
    /// so changing a value here changes every derived chat ID.
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Cursor => "cursor",
            Vendor::Claude => "claude",
            Vendor::Copilot => "copilot",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cursor" => Ok(Vendor::Cursor),
            "claude" => Ok(Vendor::Claude),
            "copilot" => Ok(Vendor::Copilot),
            other => Err(format!("unknown vendor: {}", other)),
        }
    }
}
