use crate::tool::{parse_arguments, Tool};
use crate::utils::{format_size, resolve_path};
use anyhow::Result;
use serde_json::{json, Value};
use std::fs;

/// Whole-file text reading with a size ceiling
pub struct ReadFileTool {
    max_bytes: u64,
}

#[derive(serde::Deserialize)]
struct ReadParams {
    file_path: String,
}

impl ReadFileTool {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

#[async_trait::async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a UTF-8 text file. Large and binary files are refused."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to read"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: ReadParams = parse_arguments(self.name(), arguments)?;
        let path = resolve_path(&params.file_path)?;

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {}", params.file_path));
        }
        if !path.is_file() {
            return Err(anyhow::anyhow!("Path is not a file: {}", params.file_path));
        }

        let size = fs::metadata(&path)?.len();
        if size > self.max_bytes {
            return Err(anyhow::anyhow!(
                "File is too large to read: {} ({}, limit {})",
                params.file_path,
                format_size(size),
                format_size(self.max_bytes)
            ));
        }

        let bytes = fs::read(&path)?;
        let content = String::from_utf8(bytes).map_err(|_| {
            anyhow::anyhow!(
                "File cannot be read as text (not valid UTF-8): {}",
                params.file_path
            )
        })?;

        Ok(format!("Contents of '{}':\n\n{}", params.file_path, content))
    }
}
