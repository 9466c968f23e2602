use crate::tool::{parse_arguments, Tool};
use crate::utils::resolve_path;
use anyhow::Result;
use serde_json::{json, Value};
use std::fs;

pub struct CreateDirectoryTool;

#[derive(serde::Deserialize)]
struct CreateDirectoryParams {
    dir_path: String,
}

impl CreateDirectoryTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Tool for CreateDirectoryTool {
    fn name(&self) -> &str {
        "create_directory"
    }

    fn description(&self) -> &str {
        "Create a directory and any missing parents. Succeeds if it already exists."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dir_path": {
                    "type": "string",
                    "description": "Path of the directory to create"
                }
            },
            "required": ["dir_path"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: CreateDirectoryParams = parse_arguments(self.name(), arguments)?;
        let path = resolve_path(&params.dir_path)?;

        fs::create_dir_all(&path).map_err(|e| {
            anyhow::anyhow!("Failed to create directory {}: {}", path.display(), e)
        })?;

        Ok(format!("Successfully created directory '{}'.", params.dir_path))
    }
}
