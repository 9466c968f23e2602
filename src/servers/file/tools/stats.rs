use crate::organizer::{directory_statistics, DirectoryStatistics, EngineOptions, FileRecord};
use crate::tool::{parse_arguments, Tool};
use crate::utils::{format_date, format_size, resolve_path};
use anyhow::Result;
use serde_json::{json, Value};

const TOP_EXTENSIONS: usize = 10;

/// Tree-wide counts, extension histogram and extremal files
pub struct DirectoryStatisticsTool {
    options: EngineOptions,
}

#[derive(serde::Deserialize)]
struct StatisticsParams {
    directory: String,
}

impl DirectoryStatisticsTool {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    fn record_name(record: &FileRecord) -> String {
        record
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| record.path.display().to_string())
    }

    fn render(directory: &str, stats: &DirectoryStatistics) -> String {
        let mut lines = vec![
            format!("Directory Statistics for '{}':", directory),
            String::new(),
            "Overview:".to_string(),
            format!("  - Total Files: {}", stats.total_files),
            format!("  - Total Directories: {}", stats.total_dirs),
            format!("  - Total Size: {}", format_size(stats.total_size)),
        ];

        if stats.is_empty() {
            lines.push(String::new());
            lines.push("No files found; there are no file types or records to report.".to_string());
            return lines.join("\n");
        }

        lines.push(String::new());
        lines.push(format!("File Types (Top {}):", TOP_EXTENSIONS));
        for (extension, count) in stats.top_extensions(TOP_EXTENSIONS) {
            lines.push(format!("  - {}: {} file(s)", extension, count));
        }

        lines.push(String::new());
        lines.push("Records:".to_string());
        if let Some(largest) = &stats.largest {
            lines.push(format!(
                "  - Largest File: {} ({})",
                Self::record_name(largest),
                format_size(largest.size)
            ));
        }
        if let Some(oldest) = &stats.oldest {
            lines.push(format!(
                "  - Oldest File: {} ({})",
                Self::record_name(oldest),
                format_date(&oldest.modified)
            ));
        }
        if let Some(newest) = &stats.newest {
            lines.push(format!(
                "  - Newest File: {} ({})",
                Self::record_name(newest),
                format_date(&newest.modified)
            ));
        }
        if stats.skipped > 0 {
            lines.push(format!("  - Unreadable entries skipped: {}", stats.skipped));
        }

        lines.join("\n")
    }
}

#[async_trait::async_trait]
impl Tool for DirectoryStatisticsTool {
    fn name(&self) -> &str {
        "get_directory_statistics"
    }

    fn description(&self) -> &str {
        "Summarize a directory tree: file and folder counts, total size, most common file types, and the largest, oldest and newest files."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory to analyze"
                }
            },
            "required": ["directory"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let params: StatisticsParams = parse_arguments(self.name(), arguments)?;
        let root = resolve_path(&params.directory)?;
        let options = self.options.clone();

        let stats =
            tokio::task::spawn_blocking(move || directory_statistics(&root, &options)).await??;

        Ok(Self::render(&params.directory, &stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_directory_has_no_records() {
        let temp_dir = TempDir::new().unwrap();
        let args = json!({ "directory": temp_dir.path() }).to_string();
        let output = DirectoryStatisticsTool::new(EngineOptions::default())
            .execute(&args)
            .await
            .unwrap();

        assert!(output.contains("  - Total Files: 0"));
        assert!(output.contains("No files found"));
        assert!(!output.contains("Largest File"));
    }

    #[tokio::test]
    async fn test_reports_records() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("big.bin"), vec![0u8; 2048]).unwrap();
        fs::write(temp_dir.path().join("sub/small.txt"), "x").unwrap();

        let args = json!({ "directory": temp_dir.path() }).to_string();
        let output = DirectoryStatisticsTool::new(EngineOptions::default())
            .execute(&args)
            .await
            .unwrap();

        assert!(output.contains("  - Total Files: 2"));
        assert!(output.contains("  - Total Directories: 1"));
        assert!(output.contains("  - .bin: 1 file(s)"));
        assert!(output.contains("  - Largest File: big.bin (2.0 KB)"));
    }
}
