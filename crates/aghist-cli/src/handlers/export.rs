use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;

use aghist_providers::{ChatProvider, Error, ToolCoverage};

use crate::args::AgentFilter;

/// Export one conversation, searched across the selected providers.
///
/// Providers are tried in order; a `ChatNotFound` from one just moves on
/// to the next, so an ID only has to exist somewhere.
pub fn by_id(providers: &[Box<dyn ChatProvider>], id: &str, out: Option<&Path>) -> Result<()> {
    for provider in providers {
        match provider.parse_by_id(id) {
            Ok(document) => {
                let path = match out {
                    Some(path) => path.to_path_buf(),
                    None => PathBuf::from(format!(
                        "result/{}_chat_{}.json",
                        provider.vendor(),
                        short_id(id)
                    )),
                };
                write_json(&path, &document)?;
                println!("Exported chat {} to {}", id, path.display());
                return Ok(());
            }
            Err(Error::ChatNotFound(_)) => continue,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("parsing chat {} from {}", id, provider.vendor()));
            }
        }
    }
    anyhow::bail!("Chat ID '{}' not found", id)
}

/// Export every conversation from the selected providers into one file.
pub fn all(
    providers: &[Box<dyn ChatProvider>],
    agent: Option<AgentFilter>,
    out: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let mut documents = Vec::new();
    let mut coverage = ToolCoverage::default();
    for provider in providers {
        let outcome = provider
            .extract_all()
            .with_context(|| format!("extracting {} chats", provider.vendor()))?;
        documents.extend(outcome.documents);
        coverage.merge(&outcome.coverage);
    }

    let path = match out {
        Some(path) => path.to_path_buf(),
        None => match agent {
            Some(filter) => PathBuf::from(format!("result/{}_chats_export.json", filter)),
            None => PathBuf::from("result/chats_export.json"),
        },
    };
    write_json(&path, &documents)?;

    let mark = if std::io::stdout().is_terminal() {
        "✓".green().bold().to_string()
    } else {
        "✓".to_string()
    };
    println!(
        "{} Successfully exported {} chats to: {}",
        mark,
        documents.len(),
        path.display()
    );

    if verbose && !coverage.is_empty() {
        println!();
        println!("Tool coverage gaps:");
        for (name, count) in &coverage.skipped {
            println!("  skipped: {} (x{})", name, count);
        }
        for (name, count) in &coverage.unknown {
            println!("  unknown: {} (x{})", name, count);
        }
    }
    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_handles_short_input() {
        assert_eq!(short_id("a1b2c3d4e5f60718"), "a1b2c3d4");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_json(&path, &serde_json::json!({"ok": true})).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["ok"], true);
    }
}
