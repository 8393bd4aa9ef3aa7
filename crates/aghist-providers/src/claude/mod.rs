//! Claude Code provider.
//!
//! Claude Code writes one JSONL transcript per session under
//! `~/.claude/projects/{encoded-project-dir}/`. Each line is one entry:
//! user and assistant messages, tool-result carriers, and bookkeeping
//! records such as file-history snapshots.

pub mod discovery;
pub mod parser;
pub mod schema;
pub mod tools;

use std::path::PathBuf;

use aghist_types::{ChatSummary, ExportDocument, Vendor};

use crate::error::{Error, Result};
use crate::tool_map::ToolCoverage;
use crate::traits::{ChatProvider, ExtractOutcome};

pub struct ClaudeProvider {
    root: PathBuf,
}

impl ClaudeProvider {
    pub fn new() -> Self {
        Self {
            root: discovery::default_root(),
        }
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }
}

impl Default for ClaudeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatProvider for ClaudeProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Claude
    }

    fn storage_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn list_metadata(&self) -> Result<Vec<ChatSummary>> {
        Ok(discovery::transcript_files(&self.root)
            .iter()
            .filter_map(|path| parser::summarize(path))
            .collect())
    }

    fn parse_by_id(&self, chat_id: &str) -> Result<ExportDocument> {
        let mut coverage = ToolCoverage::default();
        for path in discovery::transcript_files(&self.root) {
            if discovery::file_id(&path) != chat_id {
                continue;
            }
            if let Ok(Some(doc)) = parser::parse_file(&path, &mut coverage) {
                return Ok(doc);
            }
        }
        Err(Error::ChatNotFound(chat_id.to_string()))
    }

    fn extract_all(&self) -> Result<ExtractOutcome> {
        let mut outcome = ExtractOutcome::default();
        for path in discovery::transcript_files(&self.root) {
            if let Ok(Some(doc)) = parser::parse_file(&path, &mut outcome.coverage) {
                outcome.documents.push(doc);
            }
        }
        Ok(outcome)
    }
}
