//! Project identification and session metadata for workspace stores.

use rusqlite::Connection;
use serde_json::Value;

use super::store;
use crate::error::Result;

pub const UNKNOWN_PROJECT: &str = "(unknown)";

const HOME_MARKERS: [&str; 2] = ["Users", "home"];
const KNOWN_PROJECTS: [&str; 6] = [
    "genaisf",
    "cursor-view",
    "cursor",
    "cursor-apps",
    "universal-github",
    "inquiry",
];
const CONTAINER_DIRS: [&str; 8] = [
    "Documents",
    "Projects",
    "Code",
    "workspace",
    "repos",
    "git",
    "src",
    "codebase",
];

/// Project name and root derived from a workspace store.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInfo {
    pub name: String,
    pub root_path: String,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        ProjectInfo {
            name: UNKNOWN_PROJECT.to_string(),
            root_path: UNKNOWN_PROJECT.to_string(),
        }
    }
}

/// Per-conversation session metadata from the `allComposers` table.
#[derive(Debug, Clone, Default)]
pub struct SessionMeta {
    pub title: Option<String>,
    pub created_at: Option<f64>,
    pub last_updated_at: Option<f64>,
}

/// Identify the project a workspace store belongs to: common prefix of
/// the file-history resources, else the `debug.selectedroot` record,
/// else unknown.
pub fn workspace_info(conn: &Connection) -> Result<ProjectInfo> {
    let username = current_username();
    let mut project = ProjectInfo::default();

    let mut paths = Vec::new();
    if let Some(entries) = store::item_table_json(conn, "history.entries")?
        && let Some(list) = entries.as_array()
    {
        for entry in list {
            if let Some(resource) = entry.pointer("/editor/resource").and_then(Value::as_str)
                && let Some(rest) = resource.strip_prefix("file:///")
            {
                paths.push(rest.to_string());
            }
        }
    }
    if !paths.is_empty() {
        let prefix = common_prefix(&paths);
        if let Some(idx) = prefix.rfind('/')
            && idx > 0
        {
            let root = &prefix[..idx];
            project = ProjectInfo {
                name: project_name_from_path(root, &username),
                root_path: format!("/{}", root.trim_start_matches('/')),
            };
        }
    }

    if project.name == UNKNOWN_PROJECT
        && let Some(selected) = store::item_table_json(conn, "debug.selectedroot")?
        && let Some(resource) = selected.as_str()
        && let Some(rest) = resource.strip_prefix("file:///")
        && !rest.is_empty()
    {
        let root_path = format!("/{}", rest.trim_matches('/'));
        project = ProjectInfo {
            name: project_name_from_path(&root_path, &username),
            root_path,
        };
    }

    Ok(project)
}

/// Session metadata rows from `composer.composerData`, in table order.
pub fn session_metadata(conn: &Connection) -> Result<Vec<(String, SessionMeta)>> {
    let Some(composer_data) = store::item_table_json(conn, store::COMPOSER_KEY)? else {
        return Ok(Vec::new());
    };
    let Some(composers) = composer_data.get("allComposers").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    let mut metas = Vec::new();
    for comp in composers {
        let Some(id) = comp.get("composerId").and_then(Value::as_str) else {
            continue;
        };
        metas.push((
            id.to_string(),
            SessionMeta {
                title: comp
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                created_at: comp.get("createdAt").and_then(Value::as_f64),
                last_updated_at: comp.get("lastUpdatedAt").and_then(Value::as_f64),
            },
        ));
    }
    Ok(metas)
}

/// Best-effort project name from a filesystem path.
///
/// Walks the segments after the home directory: a known project name wins
/// (deepest first), a `Documents/codebase/{name}` layout yields `{name}`,
/// otherwise the last segment. Container directories defer to their next
/// segment, and a bare user directory reads as "Home Directory".
pub fn project_name_from_path(root_path: &str, username: &str) -> String {
    if root_path.is_empty() || root_path == "/" {
        return "Root".to_string();
    }
    let parts: Vec<&str> = root_path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return "Root".to_string();
    }

    let user_index = parts
        .iter()
        .position(|p| HOME_MARKERS.contains(p))
        .map(|i| i + 1);

    if let Some(idx) = user_index
        && idx < parts.len()
        && parts[idx] == username
        && parts.len() <= idx + 1
    {
        return "Home Directory".to_string();
    }

    let mut name: &str = match user_index {
        Some(idx) if idx + 1 < parts.len() => {
            let mut picked = parts[idx + 1..]
                .iter()
                .rev()
                .find(|p| KNOWN_PROJECTS.contains(*p))
                .copied();
            if picked.is_none()
                && parts.contains(&"Documents")
                && let Some(cb) = parts.iter().position(|p| *p == "codebase")
                && cb + 1 < parts.len()
            {
                picked = Some(parts[cb + 1]);
            }
            let mut name = picked.unwrap_or(parts[parts.len() - 1]);
            if name == username {
                name = "Home Directory";
            }
            if CONTAINER_DIRS.contains(&name)
                && let Some(ci) = parts.iter().position(|p| *p == name)
                && ci + 1 < parts.len()
            {
                name = parts[ci + 1];
            }
            name
        }
        _ => parts[parts.len() - 1],
    };
    if name == username {
        name = "Home Directory";
    }
    if name.is_empty() {
        "Unknown Project".to_string()
    } else {
        name.to_string()
    }
}

/// Character-level longest common prefix, as used on history paths.
fn common_prefix(paths: &[String]) -> String {
    let mut iter = paths.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let mut prefix = first.as_str();
    for path in iter {
        let shared = prefix
            .char_indices()
            .zip(path.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, c), _)| i + c.len_utf8())
            .unwrap_or(0);
        prefix = &prefix[..shared];
        if prefix.is_empty() {
            break;
        }
    }
    prefix.to_string()
}

fn current_username() -> String {
    dirs::home_dir()
        .and_then(|home| home.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_project_wins_deepest_first() {
        assert_eq!(
            project_name_from_path("/Users/dev/work/cursor-view/backend", "dev"),
            "cursor-view"
        );
    }

    #[test]
    fn test_last_segment_when_nothing_known() {
        assert_eq!(
            project_name_from_path("/Users/dev/work/myproject", "dev"),
            "myproject"
        );
    }

    #[test]
    fn test_container_defers_to_next_segment() {
        assert_eq!(
            project_name_from_path("/Users/dev/Documents/codebase/src/app", "dev"),
            "app"
        );
        // A container with nothing after it keeps its own name.
        assert_eq!(
            project_name_from_path("/home/dev/Projects", "dev"),
            "Projects"
        );
    }

    #[test]
    fn test_documents_codebase_layout() {
        assert_eq!(
            project_name_from_path("/Users/dev/Documents/codebase/exporter/src", "dev"),
            "exporter"
        );
    }

    #[test]
    fn test_bare_home_directory() {
        assert_eq!(project_name_from_path("/Users/dev", "dev"), "Home Directory");
        assert_eq!(project_name_from_path("/Users/other", "dev"), "other");
    }

    #[test]
    fn test_root_and_empty_paths() {
        assert_eq!(project_name_from_path("/", "dev"), "Root");
        assert_eq!(project_name_from_path("", "dev"), "Root");
    }

    #[test]
    fn test_path_outside_home_uses_last_segment() {
        assert_eq!(project_name_from_path("/opt/services/api", "dev"), "api");
        // Container filtering only applies below a home directory.
        assert_eq!(project_name_from_path("/opt/src", "dev"), "src");
    }

    #[test]
    fn test_common_prefix() {
        let paths = vec![
            "Users/dev/app/src/main.rs".to_string(),
            "Users/dev/app/src/lib.rs".to_string(),
            "Users/dev/app/Cargo.toml".to_string(),
        ];
        assert_eq!(common_prefix(&paths), "Users/dev/app/");
        assert_eq!(common_prefix(&[]), "");
        assert_eq!(
            common_prefix(&["abc".to_string(), "xyz".to_string()]),
            ""
        );
    }

    fn store_with(rows: &[(&str, Value)]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE ItemTable (key TEXT PRIMARY KEY, value BLOB)")
            .unwrap();
        for (key, value) in rows {
            conn.execute(
                "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, value.to_string()],
            )
            .unwrap();
        }
        conn
    }

    #[test]
    fn test_workspace_info_from_history() {
        let entries = json!([
            {"editor": {"resource": "file:///Users/dev/app/src/main.rs"}},
            {"editor": {"resource": "file:///Users/dev/app/README.md"}},
            {"editor": {"resource": "untitled:Untitled-1"}}
        ]);
        let conn = store_with(&[("history.entries", entries)]);
        let project = workspace_info(&conn).unwrap();
        assert_eq!(project.name, "app");
        assert_eq!(project.root_path, "/Users/dev/app");
    }

    #[test]
    fn test_workspace_info_selectedroot_fallback() {
        let conn = store_with(&[(
            "debug.selectedroot",
            json!("file:///Users/dev/fallback-proj/"),
        )]);
        let project = workspace_info(&conn).unwrap();
        assert_eq!(project.name, "fallback-proj");
        assert_eq!(project.root_path, "/Users/dev/fallback-proj");
    }

    #[test]
    fn test_workspace_info_defaults_unknown() {
        let conn = store_with(&[]);
        let project = workspace_info(&conn).unwrap();
        assert_eq!(project.name, UNKNOWN_PROJECT);
        assert_eq!(project.root_path, UNKNOWN_PROJECT);
    }

    #[test]
    fn test_session_metadata_rows() {
        let composer = json!({
            "allComposers": [
                {"composerId": "c1", "name": "First", "createdAt": 1700000000000.0, "lastUpdatedAt": 1700000100000.0},
                {"composerId": "c2", "name": ""},
                {"name": "no id, skipped"}
            ]
        });
        let conn = store_with(&[(store::COMPOSER_KEY, composer)]);
        let metas = session_metadata(&conn).unwrap();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].0, "c1");
        assert_eq!(metas[0].1.title.as_deref(), Some("First"));
        assert_eq!(metas[0].1.last_updated_at, Some(1700000100000.0));
        assert!(metas[1].1.title.is_none());
    }
}
