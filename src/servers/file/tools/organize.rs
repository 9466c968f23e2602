use crate::organizer::{organize_by_type, EngineOptions, OrganizeReport, CATEGORY_TABLE};
use crate::tool::{parse_arguments, Tool};
use crate::utils::resolve_path;
use anyhow::Result;
use serde_json::{json, Value};

/// Copies files into per-category folders
pub struct OrganizeTool {
    options: EngineOptions,
}

#[derive(serde::Deserialize)]
struct OrganizeParams {
    source_dir: String,
    target_dir: String,
}

impl OrganizeTool {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    fn render(params: &OrganizeParams, report: &OrganizeReport) -> String {
        let mut output = format!(
            "Files organized from '{}' to '{}':\n",
            params.source_dir, params.target_dir
        );
        if report.placed.is_empty() {
            output.push_str("  (no files copied)\n");
        }
        for (category, count) in &report.placed {
            output.push_str(&format!("  {}: {} file(s)\n", category, count));
        }
        if report.skipped > 0 {
            output.push_str(&format!("  Skipped: {} file(s)\n", report.skipped));
        }
        output.trim_end().to_string()
    }
}

#[async_trait::async_trait]
impl Tool for OrganizeTool {
    fn name(&self) -> &str {
        "organize_files_by_type"
    }

    fn description(&self) -> &str {
        "Copy every file under a source directory into category folders (Images, Documents, Code, ...) inside a target directory. Originals are kept and name clashes get a numeric suffix."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "source_dir": {
                    "type": "string",
                    "description": "Source directory containing files to organize"
                },
                "target_dir": {
                    "type": "string",
                    "description": "Target directory where category folders are created"
                }
            },
            "required": ["source_dir", "target_dir"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: OrganizeParams = parse_arguments(self.name(), arguments)?;
        let source = resolve_path(&params.source_dir)?;
        let target = resolve_path(&params.target_dir)?;
        let options = self.options.clone();

        let report = tokio::task::spawn_blocking(move || {
            organize_by_type(&source, &target, &CATEGORY_TABLE, &options)
        })
        .await??;

        Ok(Self::render(&params, &report))
    }
}
