use crate::tool::{parse_arguments, Tool};
use crate::utils::{format_size, format_timestamp, resolve_path};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::fs;
use std::io;
use std::time::SystemTime;

/// Metadata report for a single path
pub struct FileInfoTool;

#[derive(serde::Deserialize)]
struct FileInfoParams {
    file_path: String,
}

impl FileInfoTool {
    pub fn new() -> Self {
        Self
    }

    fn describe_time(time: io::Result<SystemTime>) -> String {
        time.map(|t| format_timestamp(&DateTime::<Utc>::from(t)))
            .unwrap_or_else(|_| "Unknown".to_string())
    }
}

#[async_trait::async_trait]
impl Tool for FileInfoTool {
    fn name(&self) -> &str {
        "get_file_info"
    }

    fn description(&self) -> &str {
        "Show kind, size, timestamps and absolute path for a file or directory."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file or directory"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: FileInfoParams = parse_arguments(self.name(), arguments)?;
        let path = resolve_path(&params.file_path)?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Path does not exist: {}", params.file_path));
        }

        let metadata = fs::metadata(&path)?;
        let kind = if metadata.is_dir() { "Directory" } else { "File" };
        let extension = crate::organizer::walker::extension_of(&path);

        Ok(format!(
            "File Information for '{}':\n\
             - Type: {}\n\
             - Size: {} ({} bytes)\n\
             - Extension: {}\n\
             - Created: {}\n\
             - Modified: {}\n\
             - Absolute Path: {}",
            params.file_path,
            kind,
            format_size(metadata.len()),
            metadata.len(),
            if extension.is_empty() { "none" } else { extension.as_str() },
            Self::describe_time(metadata.created()),
            Self::describe_time(metadata.modified()),
            path.canonicalize()?.display()
        ))
    }
}
