//! GitHub Copilot provider.
//!
//! Copilot chat lives in VS Code's `workspaceStorage`: one JSON document
//! per session under `{workspace_hash}/chatSessions/`. A session carries
//! its full request/response history, so extraction is a per-file walk
//! with no cross-database reconciliation.

pub mod discovery;
pub mod parser;
pub mod schema;
pub mod tools;

use std::path::PathBuf;

use aghist_types::{ChatSummary, ExportDocument, Vendor};

use crate::error::{Error, Result};
use crate::tool_map::ToolCoverage;
use crate::traits::{ChatProvider, ExtractOutcome};

pub struct CopilotProvider {
    root: PathBuf,
}

impl CopilotProvider {
    pub fn new() -> Self {
        Self {
            root: discovery::default_root(),
        }
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }
}

impl Default for CopilotProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatProvider for CopilotProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Copilot
    }

    fn storage_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn list_metadata(&self) -> Result<Vec<ChatSummary>> {
        Ok(discovery::session_files(&self.root)
            .iter()
            .filter_map(|path| parser::summarize(path))
            .collect())
    }

    fn parse_by_id(&self, chat_id: &str) -> Result<ExportDocument> {
        let mut coverage = ToolCoverage::default();
        for path in discovery::session_files(&self.root) {
            if discovery::file_id(&path) != chat_id {
                continue;
            }
            if let Ok(Some(doc)) = parser::parse_file(&path, &self.root, &mut coverage) {
                return Ok(doc);
            }
        }
        Err(Error::ChatNotFound(chat_id.to_string()))
    }

    fn extract_all(&self) -> Result<ExtractOutcome> {
        let mut outcome = ExtractOutcome::default();
        for path in discovery::session_files(&self.root) {
            if let Ok(Some(doc)) = parser::parse_file(&path, &self.root, &mut outcome.coverage) {
                outcome.documents.push(doc);
            }
        }
        Ok(outcome)
    }
}
