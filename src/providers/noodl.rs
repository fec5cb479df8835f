//! Noodl local graph/symbol search over a cloned repository

use super::traits::*;
use crate::results::{truncate_chars, SearchResult, MAX_CONTENT_CHARS};
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Runs the `noodl` executable against a local working copy
pub struct Noodl {
    binary: String,
    resolved: Option<PathBuf>,
}

impl Noodl {
    /// Look up `binary` on `PATH` once, at construction
    pub fn new(binary: impl Into<String>) -> Self {
        let binary = binary.into();
        let resolved = which::which(&binary).ok();
        if resolved.is_none() {
            debug!("{} not found on PATH, local graph search disabled", binary);
        }
        Self { binary, resolved }
    }
}

/// `owner/name` recovered from a cache directory named `owner__name`
pub fn repo_name_from_path(repo_path: &Path) -> String {
    let name = repo_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.replace("__", "/")
}

fn parse_symbols(output: &str) -> Result<Vec<SearchResult>> {
    let data: serde_json::Value = serde_json::from_str(output)?;
    let mut results = Vec::new();

    for process in json_items(&data, &["results"]) {
        for symbol in json_items(process, &["symbols"]) {
            let field = |key: &str| symbol.get(key).and_then(|v| v.as_str()).unwrap_or_default();
            let (name, file_path, symbol_type) = (field("name"), field("file_path"), field("symbol_type"));
            if name.is_empty() || file_path.is_empty() {
                continue;
            }

            let title = if symbol_type.is_empty() {
                name.to_string()
            } else {
                format!("{}: {}", symbol_type, name)
            };
            results.extend(SearchResult::new(
                title,
                format!("file://{}", file_path),
                truncate_chars(field("content"), MAX_CONTENT_CHARS),
                "noodl",
            ));
        }
    }

    Ok(results)
}

impl LocalCodeSearch for Noodl {
    fn name(&self) -> &str {
        "noodl"
    }

    fn is_available(&self) -> bool {
        self.resolved.is_some()
    }

    fn search_local(&self, query: &str, repo_path: &Path, limit: usize) -> Result<Vec<SearchResult>> {
        let Some(binary) = &self.resolved else {
            return Ok(Vec::new());
        };

        let output = Command::new(binary)
            .arg("search")
            .arg(query)
            .arg(repo_name_from_path(repo_path))
            .args(["--limit", &limit.to_string(), "--include-content", "--format", "json"])
            .current_dir(repo_path)
            .output()?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_symbols(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_from_path() {
        assert_eq!(
            repo_name_from_path(Path::new("/cache/repos/facebook__react")),
            "facebook/react"
        );
        assert_eq!(repo_name_from_path(Path::new("/cache/plain")), "plain");
    }

    #[test]
    fn test_parse_symbols() {
        let output = r#"{"results": [{"symbols": [
            {"name": "spawn", "file_path": "/r/src/task.rs", "symbol_type": "function", "content": "pub fn spawn()"},
            {"name": "Runtime", "file_path": "/r/src/rt.rs"},
            {"name": "", "file_path": "/r/x.rs"}
        ]}]}"#;

        let results = parse_symbols(output).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "function: spawn");
        assert_eq!(results[0].url, "file:///r/src/task.rs");
        assert_eq!(results[1].title, "Runtime");
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let noodl = Noodl::new("definitely-not-installed-graph-tool");
        assert!(!noodl.is_available());
        let results = noodl.search_local("q", Path::new("/tmp"), 5).unwrap();
        assert!(results.is_empty());
    }
}
