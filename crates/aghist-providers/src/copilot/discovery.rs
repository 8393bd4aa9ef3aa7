//! Locating Copilot chat sessions under VS Code's `workspaceStorage`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use aghist_core::chat_id;
use aghist_types::Vendor;

/// VS Code user-data roots that can hold Copilot chats, stable channel
/// first.
fn root_candidates() -> [PathBuf; 2] {
    let home = dirs::home_dir().unwrap_or_default();
    let base = if cfg!(target_os = "windows") {
        home.join("AppData").join("Roaming")
    } else if cfg!(target_os = "macos") {
        home.join("Library").join("Application Support")
    } else {
        home.join(".config")
    };
    [
        base.join("Code").join("User").join("workspaceStorage"),
        base.join("Code - Insiders")
            .join("User")
            .join("workspaceStorage"),
    ]
}

/// First candidate root that exists on disk, else the stable-channel
/// path.
pub fn default_root() -> PathBuf {
    let [stable, insiders] = root_candidates();
    if !stable.exists() && insiders.exists() {
        insiders
    } else {
        stable
    }
}

/// All chat session files, sorted: `{workspace_hash}/chatSessions/*.json`.
/// Workspace directories without a `chatSessions` folder hold no chats.
pub fn session_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(3)
        .max_depth(3)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension().is_some_and(|ext| ext == "json")
                && p.parent()
                    .and_then(Path::file_name)
                    .is_some_and(|name| name == "chatSessions")
        })
        .collect();
    files.sort();
    files
}

/// The workspace-storage hash directory a session file lives under.
pub fn workspace_id(path: &Path) -> String {
    path.parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Stable id for a session file, keyed by `{workspace_id}/{file_name}`.
pub fn file_id(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    chat_id(Vendor::Copilot, &format!("{}/{file}", workspace_id(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_session_files_only_under_chat_sessions() {
        let root = tempfile::tempdir().unwrap();
        let ws = root.path().join("a1b2c3d4e5");
        fs::create_dir_all(ws.join("chatSessions")).unwrap();
        fs::write(ws.join("chatSessions").join("s2.json"), "{}").unwrap();
        fs::write(ws.join("chatSessions").join("s1.json"), "{}").unwrap();
        fs::write(ws.join("chatSessions").join("notes.txt"), "").unwrap();
        fs::write(ws.join("workspace.json"), "{}").unwrap();

        let other = root.path().join("zz9y8x");
        fs::create_dir_all(other.join("backups")).unwrap();
        fs::write(other.join("backups").join("s3.json"), "{}").unwrap();

        let files = session_files(root.path());
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["s1.json", "s2.json"]);
    }

    #[test]
    fn test_file_id_keyed_by_workspace_and_file() {
        let a = file_id(Path::new("/store/ws1/chatSessions/chat.json"));
        let b = file_id(Path::new("/store/ws2/chatSessions/chat.json"));
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
        assert_eq!(a, file_id(Path::new("/store/ws1/chatSessions/chat.json")));
    }

    #[test]
    fn test_workspace_id_is_grandparent_dir() {
        let path = Path::new("/store/ws1/chatSessions/chat.json");
        assert_eq!(workspace_id(path), "ws1");
    }

    #[test]
    fn test_missing_root_finds_nothing() {
        assert!(session_files(Path::new("/nonexistent/copilot-root")).is_empty());
    }
}
