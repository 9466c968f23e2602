use crate::tool::{parse_arguments, Tool};
use crate::utils::{format_size, resolve_path};
use anyhow::Result;
use serde_json::{json, Value};
use std::fs;

/// Directory listing with file sizes
pub struct ListDirectoryTool;

#[derive(serde::Deserialize)]
struct ListParams {
    path: String,
}

impl ListDirectoryTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the contents of a directory, marking subdirectories and showing file sizes."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory path to list (absolute or relative to the working directory)"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: ListParams = parse_arguments(self.name(), arguments)?;
        let path = resolve_path(&params.path)?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Directory does not exist: {}", params.path));
        }
        if !path.is_dir() {
            return Err(anyhow::anyhow!("Path is not a directory: {}", params.path));
        }

        let mut items = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let line = match entry.metadata() {
                Ok(metadata) if metadata.is_dir() => format!("[DIR]  {}/", name),
                Ok(metadata) => format!("[FILE] {} ({})", name, format_size(metadata.len())),
                Err(_) => format!("[FILE] {} (unknown size)", name),
            };
            items.push(line);
        }

        if items.is_empty() {
            return Ok(format!("Directory '{}' is empty.", params.path));
        }

        items.sort();
        Ok(format!(
            "Contents of '{}' ({} entries):\n{}",
            params.path,
            items.len(),
            items.join("\n")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lists_files_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("hello.txt"), "hello").unwrap();

        let args = json!({ "path": temp_dir.path() }).to_string();
        let output = ListDirectoryTool::new().execute(&args).await.unwrap();

        assert!(output.contains("[DIR]  nested/"));
        assert!(output.contains("[FILE] hello.txt (5 B)"));
        assert!(output.contains("2 entries"));
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let args = json!({ "path": temp_dir.path() }).to_string();
        let output = ListDirectoryTool::new().execute(&args).await.unwrap();
        assert!(output.ends_with("is empty."));
    }

    #[tokio::test]
    async fn test_missing_directory_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let args = json!({ "path": temp_dir.path().join("missing") }).to_string();
        assert!(ListDirectoryTool::new().execute(&args).await.is_err());
    }
}
