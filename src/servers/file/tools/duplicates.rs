use crate::organizer::{find_duplicates, DuplicateReport, EngineOptions};
use crate::tool::{parse_arguments, Tool};
use crate::utils::{format_size, resolve_path};
use anyhow::Result;
use serde_json::{json, Value};

/// Content-hash duplicate detection
pub struct FindDuplicatesTool {
    options: EngineOptions,
}

#[derive(serde::Deserialize)]
struct FindDuplicatesParams {
    directory: String,
    #[serde(default)]
    min_size: u64,
}

impl FindDuplicatesTool {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    fn render(directory: &str, report: &DuplicateReport) -> String {
        if report.groups.is_empty() {
            return format!(
                "No duplicate files found in '{}' (scanned {} files).",
                directory, report.files_scanned
            );
        }

        let mut output = format!(
            "Found {} duplicate file group(s) (scanned {} files, {} reclaimable):\n",
            report.groups.len(),
            report.files_scanned,
            format_size(report.wasted_bytes())
        );
        for group in &report.groups {
            let hex = group.digest.to_hex();
            output.push_str(&format!(
                "\nDuplicate group (Size: {} bytes, Hash: {}...):\n",
                group.size,
                &hex[..8]
            ));
            for file in &group.files {
                output.push_str(&format!("   - {}\n", file.path.display()));
            }
        }
        if report.skipped > 0 {
            output.push_str(&format!(
                "\n{} file(s) could not be read and were skipped.",
                report.skipped
            ));
        }
        output.trim_end().to_string()
    }
}

#[async_trait::async_trait]
impl Tool for FindDuplicatesTool {
    fn name(&self) -> &str {
        "find_duplicate_files"
    }

    fn description(&self) -> &str {
        "Find files with byte-identical content under a directory (recursive), grouped by content hash."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory to search for duplicates"
                },
                "min_size": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Ignore files smaller than this many bytes (default: 0)"
                }
            },
            "required": ["directory"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: FindDuplicatesParams = parse_arguments(self.name(), arguments)?;
        let root = resolve_path(&params.directory)?;
        let options = self.options.clone();
        let min_size = params.min_size;

        let report =
            tokio::task::spawn_blocking(move || find_duplicates(&root, min_size, &options))
                .await??;

        Ok(Self::render(&params.directory, &report))
    }
}
