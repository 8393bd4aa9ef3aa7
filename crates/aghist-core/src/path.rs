use std::path::Path;

/// Canonical string form of a database path, used as chat ID key material.
///
/// Resolves symlinks when the file exists so the same store reached through
/// different spellings keys identically. For paths that cannot be resolved
/// the fallback is the textual path with backslashes flattened to forward
/// slashes, keeping IDs portable across Windows and Unix spellings.
pub fn normalize_db_path(path: &Path) -> String {
    match path.canonicalize() {
        Ok(resolved) => resolved.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}
