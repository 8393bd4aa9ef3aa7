//! Shaping a reconciled conversation into the export document layout.

use chrono::{Duration, Utc};

use aghist_core::{epoch_to_iso_utc, format_iso_utc, now_iso_utc, parse_iso_utc, timezone_label};
use aghist_types::{ExportDocument, ExportMessage, ExportMetadata, MessageContent};

use super::reconcile::ReconciledConversation;
use super::workspace::UNKNOWN_PROJECT;

pub const DEFAULT_MODEL: &str = "Claude Sonnet 4.0";

/// Conversations Cursor never titled fall back to a key-derived label.
fn display_title(conv: &ReconciledConversation) -> String {
    if let Some(title) = conv
        .meta
        .title
        .as_deref()
        .filter(|t| !t.is_empty() && *t != "(untitled)")
    {
        return title.to_string();
    }
    let stem: String = conv.conversation_key.chars().take(8).collect();
    format!("Chat {stem}")
}

/// Build the export document.
///
/// Messages keep their recorded timestamps; the gaps are filled by
/// stepping a synthetic clock 15 seconds per emitted message from the
/// conversation's creation time. Text messages that are blank after
/// trimming are not emitted and do not advance the clock.
pub fn to_export_document(conv: &ReconciledConversation) -> ExportDocument {
    let created_at = conv
        .meta
        .created_at
        .and_then(epoch_to_iso_utc)
        .unwrap_or_else(now_iso_utc);
    let project = if conv.project.name == UNKNOWN_PROJECT {
        "Unknown Project".to_string()
    } else {
        conv.project.name.clone()
    };

    let mut current = parse_iso_utc(&created_at).unwrap_or_else(Utc::now);
    let mut messages = Vec::with_capacity(conv.messages.len());
    for msg in &conv.messages {
        let timestamp = msg
            .timestamp
            .and_then(epoch_to_iso_utc)
            .unwrap_or_else(|| format_iso_utc(current));
        match &msg.content {
            MessageContent::Text(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                messages.push(ExportMessage::text(msg.role, text.clone(), timestamp));
            }
            MessageContent::Tool(call) => {
                messages.push(ExportMessage::tool(msg.role, call.clone(), timestamp));
            }
        }
        current += Duration::seconds(15);
    }

    ExportDocument {
        title: display_title(conv),
        metadata: ExportMetadata {
            model: DEFAULT_MODEL.to_string(),
            chat_timezone: timezone_label(),
            project,
        },
        created_at,
        messages,
    }
}
