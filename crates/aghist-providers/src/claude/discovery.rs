//! Locating Claude Code transcripts under `~/.claude/projects`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use aghist_core::chat_id;
use aghist_types::Vendor;

pub fn default_root() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".claude").join("projects")
}

/// All transcript files, sorted: `{project_dir}/*.jsonl` plus stray
/// `.json` session files. Dot-prefixed project dirs and file names are
/// cache artifacts and are skipped.
pub fn transcript_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext == "jsonl" || ext == "json")
        })
        .collect();
    files.sort();
    files
}

/// Stable id for a transcript, keyed by `{project_dir}/{file_name}`.
pub fn file_id(path: &Path) -> String {
    let project = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    chat_id(Vendor::Claude, &format!("{project}/{file}"))
}

/// The encoded project directory name a transcript lives in, carried as
/// the export `Project` field.
pub fn project_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
