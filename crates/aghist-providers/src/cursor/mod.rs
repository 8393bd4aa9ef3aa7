//! Cursor IDE provider.
//!
//! Cursor scatters one conversation across several SQLite stores: legacy
//! chat tabs and composer stubs in workspace `state.vscdb` files, bubble
//! rows and composer snapshots in `cursorDiskKV`, and the global store in
//! `globalStorage`. The submodules read each shape into [`record::RawRecord`]s
//! and [`reconcile`] merges them back into whole conversations.

pub mod discovery;
pub mod diskkv;
pub mod format;
pub mod legacy;
pub mod record;
pub mod reconcile;
pub mod richtext;
pub mod snapshot;
pub mod store;
pub mod tools;
pub mod workspace;

use std::path::PathBuf;

use aghist_core::{chat_id, epoch_to_date, normalize_db_path, today_date};
use aghist_types::{ChatSummary, ExportDocument, Vendor};

use crate::error::{Error, Result};
use crate::traits::{ChatProvider, ExtractOutcome};

use self::discovery::ChatHandle;

pub struct CursorProvider {
    root: PathBuf,
}

impl CursorProvider {
    pub fn new() -> Self {
        Self {
            root: discovery::default_root(),
        }
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Stable id for a handle. The store path is part of the key because
    /// the same conversation key can exist in unrelated Cursor installs.
    fn handle_id(handle: &ChatHandle) -> String {
        let unique = format!(
            "{}:{}",
            handle.conversation_key,
            normalize_db_path(&handle.db_path)
        );
        chat_id(Vendor::Cursor, &unique)
    }

    fn find_handle(&self, id: &str) -> Option<ChatHandle> {
        discovery::discover_handles(&self.root)
            .into_iter()
            .find(|handle| Self::handle_id(handle) == id)
    }
}

impl Default for CursorProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatProvider for CursorProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Cursor
    }

    fn storage_root(&self) -> PathBuf {
        self.root.clone()
    }

    /// Listing reads session metadata only; no conversation payload is
    /// parsed and no tool call is normalized.
    fn list_metadata(&self) -> Result<Vec<ChatSummary>> {
        let mut summaries = Vec::new();
        for handle in discovery::discover_handles(&self.root) {
            let meta = match store::open_read_only(&handle.db_path) {
                Ok(conn) => reconcile::single_meta(&conn, &handle),
                Err(_) => workspace::SessionMeta::default(),
            };
            let title = meta.title.filter(|t| !t.is_empty()).unwrap_or_else(|| {
                let stem: String = handle.conversation_key.chars().take(8).collect();
                format!("Chat {stem}")
            });
            let date = meta
                .created_at
                .and_then(epoch_to_date)
                .unwrap_or_else(today_date);
            summaries.push(ChatSummary {
                id: Self::handle_id(&handle),
                title,
                date,
                file_path: handle.db_path.to_string_lossy().into_owned(),
            });
        }
        Ok(summaries)
    }

    fn parse_by_id(&self, chat_id: &str) -> Result<ExportDocument> {
        self.find_handle(chat_id)
            .and_then(|handle| reconcile::reconcile_single(&handle))
            .map(|conv| format::to_export_document(&conv))
            .ok_or_else(|| Error::ChatNotFound(chat_id.to_string()))
    }

    fn extract_all(&self) -> Result<ExtractOutcome> {
        let outcome = reconcile::reconcile(&self.root);
        let documents = outcome
            .conversations
            .iter()
            .map(format::to_export_document)
            .collect();
        Ok(ExtractOutcome {
            documents,
            coverage: outcome.coverage,
        })
    }
}
