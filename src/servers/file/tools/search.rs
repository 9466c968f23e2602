use crate::organizer::walker::extension_of;
use crate::tool::{parse_arguments, Tool};
use crate::utils::resolve_path;
use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Case-insensitive substring search across text files
pub struct SearchContentTool;

#[derive(serde::Deserialize)]
struct SearchParams {
    directory: String,
    search_term: String,
    #[serde(default = "default_extensions")]
    file_extensions: String,
}

fn default_extensions() -> String {
    ".txt,.py,.md,.json,.csv".to_string()
}

impl SearchContentTool {
    pub fn new() -> Self {
        Self
    }

    fn parse_extensions(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                let ext = ext.to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect()
    }

    /// Occurrences of `needle` (already lower-cased) in the file, or `None`
    /// when the file cannot be read.
    fn count_matches(path: &Path, needle: &str) -> Option<usize> {
        let bytes = fs::read(path).ok()?;
        let haystack = String::from_utf8_lossy(&bytes).to_lowercase();
        Some(haystack.matches(needle).count())
    }

    fn search(root: &Path, term: &str, extensions: &[String]) -> Vec<(PathBuf, usize)> {
        let needle = term.to_lowercase();
        let mut results = Vec::new();

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            if !extensions.contains(&extension_of(entry.path())) {
                continue;
            }
            match Self::count_matches(entry.path(), &needle) {
                Some(0) => {}
                Some(count) => results.push((entry.into_path(), count)),
                None => log::debug!("Skipping unreadable file: {}", entry.path().display()),
            }
        }

        results.sort();
        results
    }
}

#[async_trait::async_trait]
impl Tool for SearchContentTool {
    fn name(&self) -> &str {
        "search_files_by_content"
    }

    fn description(&self) -> &str {
        "Find files under a directory whose text contains a search term (case-insensitive), with per-file match counts."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory to search in (recursive)"
                },
                "search_term": {
                    "type": "string",
                    "description": "Text to search for"
                },
                "file_extensions": {
                    "type": "string",
                    "description": "Comma-separated extensions to search (default: .txt,.py,.md,.json,.csv)"
                }
            },
            "required": ["directory", "search_term"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: SearchParams = parse_arguments(self.name(), arguments)?;
        let root = resolve_path(&params.directory)?;

        if !root.is_dir() {
            return Err(anyhow::anyhow!("Directory does not exist: {}", params.directory));
        }
        if params.search_term.is_empty() {
            return Err(anyhow::anyhow!("search_term cannot be empty"));
        }

        let extensions = Self::parse_extensions(&params.file_extensions);
        let term = params.search_term.clone();
        let results =
            tokio::task::spawn_blocking(move || Self::search(&root, &term, &extensions)).await?;

        if results.is_empty() {
            return Ok(format!(
                "No files containing '{}' found in '{}'.",
                params.search_term, params.directory
            ));
        }

        let lines: Vec<String> = results
            .iter()
            .map(|(path, count)| format!("{} ({} matches)", path.display(), count))
            .collect();
        Ok(format!(
            "Found {} file(s) containing '{}':\n{}",
            results.len(),
            params.search_term,
            lines.join("\n")
        ))
    }
}
