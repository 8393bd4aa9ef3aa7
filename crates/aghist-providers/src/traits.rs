use aghist_types::{ChatSummary, ExportDocument, Vendor};
use std::path::PathBuf;

use crate::error::Result;
use crate::tool_map::ToolCoverage;

/// One agent's chat store, end to end
///
/// Responsibilities:
/// - Locate the agent's storage on disk
/// - List conversations without parsing full content
/// - Parse one conversation by its stable chat ID
/// - Extract every conversation for bulk export
pub trait ChatProvider {
    /// Which agent this provider reads
    fn vendor(&self) -> Vendor;

    /// Root of the agent's on-disk storage. May not exist; callers decide
    /// whether that matters.
    fn storage_root(&self) -> PathBuf;

    /// Lightweight listing: ID, title, date and backing file per
    /// conversation. Conversations that cannot be read are skipped.
    fn list_metadata(&self) -> Result<Vec<ChatSummary>>;

    /// Full parse of the conversation whose derived chat ID matches.
    /// Scans candidates in discovery order and stops at the first hit;
    /// returns `Error::ChatNotFound` when nothing matches.
    fn parse_by_id(&self, chat_id: &str) -> Result<ExportDocument>;

    /// Full extraction of every conversation this provider can see.
    fn extract_all(&self) -> Result<ExtractOutcome>;
}

/// Bulk extraction result with tool-mapping diagnostics
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    pub documents: Vec<ExportDocument>,
    pub coverage: ToolCoverage,
}
