use crate::tool::{parse_arguments, Tool};
use crate::utils::resolve_path;
use anyhow::Result;
use serde_json::{json, Value};
use std::fs;

/// Removes a single file or a whole directory tree
pub struct DeletePathTool;

#[derive(serde::Deserialize)]
struct DeleteParams {
    path: String,
}

impl DeletePathTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Tool for DeletePathTool {
    fn name(&self) -> &str {
        "delete_file_or_directory"
    }

    fn description(&self) -> &str {
        "Delete a file, or a directory together with everything inside it."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file or directory to delete"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: DeleteParams = parse_arguments(self.name(), arguments)?;
        let path = resolve_path(&params.path)?;

        let metadata = fs::symlink_metadata(&path)
            .map_err(|_| anyhow::anyhow!("Path does not exist: {}", params.path))?;

        if metadata.is_dir() {
            fs_extra::dir::remove(&path).map_err(|e| {
                anyhow::anyhow!("Failed to delete directory {}: {}", path.display(), e)
            })?;
            log::warn!("Deleted directory tree: {}", path.display());
            Ok(format!(
                "Successfully deleted directory '{}' and all its contents.",
                params.path
            ))
        } else {
            fs::remove_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to delete {}: {}", path.display(), e))?;
            log::info!("Deleted file: {}", path.display());
            Ok(format!("Successfully deleted file '{}'.", params.path))
        }
    }
}
