use crate::organizer::{batch_rename, EngineOptions, RenameReport, RenameRequest};
use crate::tool::{parse_arguments, Tool};
use crate::utils::resolve_path;
use anyhow::Result;
use serde_json::{json, Value};

/// Regex-driven renaming within one directory
pub struct BatchRenameTool {
    options: EngineOptions,
}

#[derive(serde::Deserialize)]
struct BatchRenameParams {
    directory: String,
    pattern: String,
    replacement: String,
    #[serde(default)]
    file_extensions: Option<String>,
}

impl BatchRenameTool {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    fn render(params: &BatchRenameParams, report: &RenameReport) -> String {
        if report.operations.is_empty() {
            let mut output = format!(
                "No files matched the pattern '{}' in '{}'.",
                params.pattern, params.directory
            );
            if report.collisions > 0 {
                output.push_str(&format!(
                    " {} file(s) left unchanged because the new name already exists.",
                    report.collisions
                ));
            }
            return output;
        }

        let lines: Vec<String> = report
            .operations
            .iter()
            .map(|op| format!("{} -> {}", op.old_name, op.new_name))
            .collect();
        let mut output = format!("Renamed {} file(s):\n{}", lines.len(), lines.join("\n"));
        if report.collisions > 0 {
            output.push_str(&format!(
                "\nLeft {} file(s) unchanged to avoid overwriting existing files.",
                report.collisions
            ));
        }
        if report.skipped > 0 {
            output.push_str(&format!("\nSkipped {} file(s).", report.skipped));
        }
        output
    }
}

#[async_trait::async_trait]
impl Tool for BatchRenameTool {
    fn name(&self) -> &str {
        "batch_rename_files"
    }

    fn description(&self) -> &str {
        "Rename files in one directory (not recursive) by regex substitution on the file name. Never overwrites existing files."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory containing files to rename"
                },
                "pattern": {
                    "type": "string",
                    "description": "Regular expression to match in file names"
                },
                "replacement": {
                    "type": "string",
                    "description": "Replacement text; use $1 or ${name} for capture groups"
                },
                "file_extensions": {
                    "type": "string",
                    "description": "Optional comma-separated extensions to restrict to (e.g. '.txt,.py')"
                }
            },
            "required": ["directory", "pattern", "replacement"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: BatchRenameParams = parse_arguments(self.name(), arguments)?;
        let directory = resolve_path(&params.directory)?;

        let mut request = RenameRequest::new(params.pattern.clone(), params.replacement.clone());
        if let Some(extensions) = &params.file_extensions {
            request = request.with_extensions(extensions);
        }
        let options = self.options.clone();

        let report =
            tokio::task::spawn_blocking(move || batch_rename(&directory, &request, &options))
                .await??;

        Ok(Self::render(&params, &report))
    }
}
