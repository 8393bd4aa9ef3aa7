use aghist_types::{CanonicalTool, Vendor};
use std::collections::BTreeMap;

/// One vendor tool name and where it lands in the canonical vocabulary.
/// `target: None` marks a name that is recognized but deliberately dropped.
struct NameSpec {
    name: &'static str,
    target: Option<CanonicalTool>,
}

impl NameSpec {
    const fn new(name: &'static str, target: CanonicalTool) -> Self {
        Self {
            name,
            target: Some(target),
        }
    }

    const fn skip(name: &'static str) -> Self {
        Self { name, target: None }
    }
}

/// Registry of Cursor tool names
const CURSOR_TOOLS: &[NameSpec] = &[
    // Read tools
    NameSpec::new("read_file", CanonicalTool::Read),
    NameSpec::new("codebase_search", CanonicalTool::Read),
    NameSpec::new("grep", CanonicalTool::Read),
    NameSpec::new("read_lints", CanonicalTool::Read),
    NameSpec::new("list_dir", CanonicalTool::Read),
    NameSpec::new("glob_file_search", CanonicalTool::Read),
    // File mutation tools
    NameSpec::new("delete_file", CanonicalTool::Delete),
    NameSpec::new("search_replace", CanonicalTool::Update),
    NameSpec::new("write", CanonicalTool::Create),
    // Shell tools
    NameSpec::new("run_terminal_cmd", CanonicalTool::Terminal),
    NameSpec::new("terminal_command", CanonicalTool::Terminal),
    // Plan tools
    NameSpec::new("todo_write", CanonicalTool::Todo),
    NameSpec::new("create_plan", CanonicalTool::Todo),
    // Web tools
    NameSpec::new("web_search", CanonicalTool::WebRequest),
];

/// Registry of Claude Code tool names
const CLAUDE_TOOLS: &[NameSpec] = &[
    // Read tools
    NameSpec::new("Read", CanonicalTool::Read),
    NameSpec::new("Grep", CanonicalTool::Read),
    NameSpec::new("Glob", CanonicalTool::Read),
    // File mutation tools
    NameSpec::new("Edit", CanonicalTool::Update),
    NameSpec::new("Write", CanonicalTool::Create),
    // Shell tools
    NameSpec::new("Bash", CanonicalTool::Terminal),
    // Plan tools
    NameSpec::new("Task", CanonicalTool::Todo),
    NameSpec::new("TodoWrite", CanonicalTool::Todo),
    // Web tools
    NameSpec::new("WebFetch", CanonicalTool::WebRequest),
];

/// Registry of Copilot tool names
const COPILOT_TOOLS: &[NameSpec] = &[
    // Code blocks in responses are surfaced as edits
    NameSpec::new("codeBlock", CanonicalTool::Update),
    // Read tools
    NameSpec::new("copilot_readFile", CanonicalTool::Read),
    NameSpec::new("copilot_getErrors", CanonicalTool::Read),
    NameSpec::new("copilot_findFiles", CanonicalTool::Read),
    NameSpec::new("copilot_findTextInFiles", CanonicalTool::Read),
    // Plan tools
    NameSpec::new("manage_todo_list", CanonicalTool::Todo),
    // Shell tools
    NameSpec::new("run_in_terminal", CanonicalTool::Terminal),
    NameSpec::skip("copilot_applyPatch"),
];

/// Mapping verdict for one vendor tool name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMapping {
    /// Maps into the canonical vocabulary
    Canonical(CanonicalTool),
    /// Recognized name, deliberately excluded from exports
    Skip,
    /// Name absent from the vendor's registry
    Unknown,
}

/// Look up a vendor's native tool name in its registry
pub fn map_tool_name(vendor: Vendor, name: &str) -> NameMapping {
    let table = match vendor {
        Vendor::Cursor => CURSOR_TOOLS,
        Vendor::Claude => CLAUDE_TOOLS,
        Vendor::Copilot => COPILOT_TOOLS,
    };

    match table.iter().find(|spec| spec.name == name) {
        Some(NameSpec {
            target: Some(tool), ..
        }) => NameMapping::Canonical(*tool),
        Some(NameSpec { target: None, .. }) => NameMapping::Skip,
        None => NameMapping::Unknown,
    }
}

/// Per-run tally of tool names that did not make it into an export.
///
/// `skipped` names are recognized and excluded on purpose; `unknown` names
/// are absent from the vendor registry and worth a look when they appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCoverage {
    pub skipped: BTreeMap<String, u64>,
    pub unknown: BTreeMap<String, u64>,
}

impl ToolCoverage {
    pub fn record_skip(&mut self, name: &str) {
        *self.skipped.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn record_unknown(&mut self, name: &str) {
        *self.unknown.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty() && self.unknown.is_empty()
    }

    pub fn merge(&mut self, other: &ToolCoverage) {
        for (name, count) in &other.skipped {
            *self.skipped.entry(name.clone()).or_insert(0) += count;
        }
        for (name, count) in &other.unknown {
            *self.unknown.entry(name.clone()).or_insert(0) += count;
        }
    }
}
