//! Cross-store merge: one conversation per key, regardless of how many
//! stores contributed records to it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use aghist_types::{MessageContent, Role};

use super::discovery::{self, ChatHandle, GLOBAL_WORKSPACE};
use super::record::RawRecord;
use super::snapshot::{self, SnapshotMeta};
use super::store;
use super::tools;
use super::workspace::{self, ProjectInfo, SessionMeta};
use super::{diskkv, legacy};
use crate::tool_map::ToolCoverage;

/// A merged message with its canonical payload, timestamp still in
/// epoch form when the store recorded one.
#[derive(Debug, Clone)]
pub struct ReconciledMessage {
    pub role: Role,
    pub content: MessageContent,
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ReconciledConversation {
    pub conversation_key: String,
    pub workspace_id: String,
    pub db_path: PathBuf,
    pub project: ProjectInfo,
    pub meta: SessionMeta,
    pub messages: Vec<ReconciledMessage>,
}

#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub conversations: Vec<ReconciledConversation>,
    pub coverage: ToolCoverage,
}

/// Merge every store under `root` into per-conversation message lists.
///
/// Workspace stores are visited in workspace-id order, then the global
/// store. The first store to mention a conversation fixes its workspace
/// attribution, metadata, and source path. Conversations that end up
/// with no messages are dropped; the survivors are ordered newest
/// activity first.
pub fn reconcile(root: &Path) -> ReconcileOutcome {
    let mut acc = Accumulator::default();

    for (ws_id, db_path) in discovery::workspaces(root) {
        let Ok(conn) = store::open_read_only(&db_path) else {
            continue;
        };
        let project = workspace::workspace_info(&conn).unwrap_or_default();
        acc.ws_proj.insert(ws_id.clone(), project);
        if let Ok(metas) = workspace::session_metadata(&conn) {
            for (key, meta) in metas {
                acc.note_meta(key, meta, &ws_id);
            }
        }
        acc.read_all(&conn, &ws_id, &db_path);
    }

    if let Some(db_path) = discovery::global_db(root)
        && let Ok(conn) = store::open_read_only(&db_path)
    {
        if let Ok(metas) = workspace::session_metadata(&conn) {
            for (key, meta) in metas {
                acc.note_meta(key, meta, GLOBAL_WORKSPACE);
            }
        }
        if let Ok(snaps) = snapshot::read_metadata(&conn) {
            for snap in snaps {
                let SnapshotMeta {
                    conversation_key,
                    title,
                    created_at,
                } = snap;
                let meta = SessionMeta {
                    title,
                    created_at,
                    last_updated_at: created_at,
                };
                acc.note_meta(conversation_key, meta, GLOBAL_WORKSPACE);
            }
        }
        acc.read_all(&conn, GLOBAL_WORKSPACE, &db_path);
    }

    acc.finish()
}

/// Rebuild a single conversation from the store a handle points at.
/// Unlike [`reconcile`] this keeps conversations with no messages, so a
/// valid id never turns into a lookup failure.
pub fn reconcile_single(handle: &ChatHandle) -> Option<ReconciledConversation> {
    let conn = store::open_read_only(&handle.db_path).ok()?;
    let mut coverage = ToolCoverage::default();
    let mut messages = Vec::new();
    for records in [
        legacy::read_records(&conn),
        diskkv::read_records(&conn),
        snapshot::read_records(&conn),
    ] {
        let Ok(records) = records else {
            continue;
        };
        for record in records {
            if record.conversation_key != handle.conversation_key {
                continue;
            }
            push_messages(record, &mut messages, &mut coverage);
        }
    }
    sort_messages(&mut messages);

    let project = if handle.workspace_id == GLOBAL_WORKSPACE {
        ProjectInfo::default()
    } else {
        workspace::workspace_info(&conn).unwrap_or_default()
    };
    let meta = single_meta(&conn, handle);

    Some(ReconciledConversation {
        conversation_key: handle.conversation_key.clone(),
        workspace_id: handle.workspace_id.clone(),
        db_path: handle.db_path.clone(),
        project,
        meta,
        messages,
    })
}

pub(crate) fn single_meta(conn: &Connection, handle: &ChatHandle) -> SessionMeta {
    if handle.workspace_id == GLOBAL_WORKSPACE {
        let key = format!("composerData:{}", handle.conversation_key);
        if let Ok(Some(blob)) = store::kv_value(conn, &key) {
            let snap = snapshot::meta_from_blob(&handle.conversation_key, &blob);
            return SessionMeta {
                title: snap.title,
                created_at: snap.created_at,
                last_updated_at: snap.created_at,
            };
        }
        return SessionMeta::default();
    }
    workspace::session_metadata(conn)
        .ok()
        .and_then(|metas| {
            metas
                .into_iter()
                .find(|(key, _)| key == &handle.conversation_key)
        })
        .map(|(_, meta)| meta)
        .unwrap_or_default()
}

fn sort_messages(messages: &mut [ReconciledMessage]) {
    // Stable sort keeps discovery order for ties and for records the
    // stores never timestamped.
    messages.sort_by(|a, b| {
        a.timestamp
            .unwrap_or(0.0)
            .total_cmp(&b.timestamp.unwrap_or(0.0))
    });
}

/// A record's tool call becomes a message before its text does, so a
/// bubble that carries both reads as act-then-say.
fn push_messages(
    record: RawRecord,
    messages: &mut Vec<ReconciledMessage>,
    coverage: &mut ToolCoverage,
) {
    let RawRecord {
        role,
        text,
        tool_call,
        timestamp,
        ..
    } = record;
    if let Some(raw) = tool_call
        && let Some(call) = tools::normalize_tool_call(&raw, coverage)
    {
        messages.push(ReconciledMessage {
            role,
            content: MessageContent::Tool(call),
            timestamp,
        });
    }
    if !text.is_empty() {
        messages.push(ReconciledMessage {
            role,
            content: MessageContent::Text(text),
            timestamp,
        });
    }
}

#[derive(Default)]
struct Accumulator {
    ws_proj: HashMap<String, ProjectInfo>,
    comp_meta: HashMap<String, SessionMeta>,
    comp_ws: HashMap<String, String>,
    sessions: HashMap<String, Vec<ReconciledMessage>>,
    order: Vec<String>,
    db_paths: HashMap<String, PathBuf>,
    coverage: ToolCoverage,
}

impl Accumulator {
    fn note_meta(&mut self, key: String, meta: SessionMeta, ws_id: &str) {
        self.comp_ws
            .entry(key.clone())
            .or_insert_with(|| ws_id.to_string());
        self.comp_meta.entry(key).or_insert(meta);
    }

    fn read_all(&mut self, conn: &Connection, ws_id: &str, db_path: &Path) {
        for records in [
            legacy::read_records(conn),
            diskkv::read_records(conn),
            snapshot::read_records(conn),
        ] {
            let Ok(records) = records else {
                continue;
            };
            for record in records {
                self.ingest(ws_id, db_path, record);
            }
        }
    }

    fn ingest(&mut self, ws_id: &str, db_path: &Path, record: RawRecord) {
        let key = record.conversation_key.clone();
        if !self.sessions.contains_key(&key) {
            self.order.push(key.clone());
            self.db_paths.insert(key.clone(), db_path.to_path_buf());
        }
        self.comp_ws
            .entry(key.clone())
            .or_insert_with(|| ws_id.to_string());
        let messages = self.sessions.entry(key).or_default();
        push_messages(record, messages, &mut self.coverage);
    }

    fn finish(mut self) -> ReconcileOutcome {
        let mut conversations = Vec::new();
        let order = std::mem::take(&mut self.order);
        for key in order {
            let Some(mut messages) = self.sessions.remove(&key) else {
                continue;
            };
            if messages.is_empty() {
                continue;
            }
            sort_messages(&mut messages);
            let workspace_id = self
                .comp_ws
                .remove(&key)
                .unwrap_or_else(|| "(unknown)".to_string());
            let project = self.ws_proj.get(&workspace_id).cloned().unwrap_or_default();
            let meta = self.comp_meta.remove(&key).unwrap_or_default();
            let db_path = self.db_paths.remove(&key).unwrap_or_default();
            conversations.push(ReconciledConversation {
                conversation_key: key,
                workspace_id,
                db_path,
                project,
                meta,
                messages,
            });
        }
        conversations.sort_by(|a, b| {
            b.meta
                .last_updated_at
                .unwrap_or(0.0)
                .total_cmp(&a.meta.last_updated_at.unwrap_or(0.0))
        });
        ReconcileOutcome {
            conversations,
            coverage: self.coverage,
        }
    }
}
