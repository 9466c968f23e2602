use crate::tool::{parse_arguments, Tool};
use crate::utils::resolve_path;
use anyhow::Result;
use serde_json::{json, Value};
use std::fs;

/// File creation, including any missing parent directories
pub struct WriteFileTool;

#[derive(serde::Deserialize)]
struct WriteParams {
    file_path: String,
    content: String,
}

impl WriteFileTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write text content to a file, creating parent directories as needed. Existing files are replaced."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path where to write the file"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: WriteParams = parse_arguments(self.name(), arguments)?;
        let path = resolve_path(&params.file_path)?;

        if path.is_dir() {
            return Err(anyhow::anyhow!(
                "Path is a directory, not a file: {}",
                params.file_path
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, &params.content).map_err(|e| {
            anyhow::anyhow!("Failed to write file {}: {}", path.display(), e)
        })?;

        log::info!("File written: {}", path.display());
        Ok(format!(
            "Successfully wrote {} characters to '{}'.",
            params.content.chars().count(),
            params.file_path
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_with_missing_parents() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a/b/out.txt");

        let args = json!({ "file_path": file, "content": "héllo" }).to_string();
        let output = WriteFileTool::new().execute(&args).await.unwrap();

        assert!(output.contains("5 characters"));
        assert_eq!(fs::read_to_string(&file).unwrap(), "héllo");
    }

    #[tokio::test]
    async fn test_refuses_directory_target() {
        let temp_dir = TempDir::new().unwrap();
        let args = json!({ "file_path": temp_dir.path(), "content": "x" }).to_string();
        assert!(WriteFileTool::new().execute(&args).await.is_err());
    }
}
