use super::error::{FileOutcome, OrganizeError, SkipReason};
use super::walker::{FileIdentity, TreeWalker};
use super::EngineOptions;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOperation {
    pub directory: PathBuf,
    pub old_name: String,
    pub new_name: String,
}

/// What to substitute and, optionally, which extensions to touch.
#[derive(Debug, Clone, Default)]
pub struct RenameRequest {
    /// Regular expression matched against the file name only.
    pub pattern: String,
    /// Replacement text; `$1` / `${name}` refer to capture groups.
    pub replacement: String,
    /// Lower-cased extensions with the leading dot. `None` matches all files.
    pub extensions: Option<Vec<String>>,
}

impl RenameRequest {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            extensions: None,
        }
    }

    /// Restrict to a comma separated list such as ".txt, md,.PY".
    pub fn with_extensions(mut self, list: &str) -> Self {
        let extensions: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                let ext = ext.to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        self.extensions = if extensions.is_empty() {
            None
        } else {
            Some(extensions)
        };
        self
    }

    fn accepts(&self, file: &FileIdentity) -> bool {
        match &self.extensions {
            Some(extensions) => extensions.iter().any(|ext| *ext == file.extension),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameReport {
    /// Renames actually performed, in the order they were applied.
    pub operations: Vec<RenameOperation>,
    /// Files left alone because the new name was already taken.
    pub collisions: usize,
    pub skipped: usize,
}

/// Rename the files directly inside `directory` by substituting
/// `request.pattern` in each file name. Existing files are never
/// overwritten.
pub fn batch_rename(
    directory: impl AsRef<Path>,
    request: &RenameRequest,
    options: &EngineOptions,
) -> Result<RenameReport, OrganizeError> {
    let pattern = Regex::new(&request.pattern).map_err(|source| OrganizeError::InvalidPattern {
        pattern: request.pattern.clone(),
        source,
    })?;
    let walker = TreeWalker::new(directory)?.single_level();

    let mut files: Vec<FileIdentity> = walker.files().filter(|f| request.accepts(f)).collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut report = RenameReport {
        skipped: walker.skipped(),
        ..RenameReport::default()
    };

    for file in files {
        options.cancel.check()?;
        match rename_one(walker.root(), &file, &pattern, &request.replacement) {
            Ok(Some(operation)) => report.operations.push(operation),
            Ok(None) => {}
            Err(SkipReason::Collision(path)) => {
                log::debug!("Not renaming {}: {} exists", file.path.display(), path.display());
                report.collisions += 1;
            }
            Err(reason) => {
                log::debug!("Not renaming {}: {}", file.path.display(), reason);
                report.skipped += 1;
            }
        }
    }

    log::info!(
        "Renamed {} file(s) in {} ({} collision(s), {} skipped)",
        report.operations.len(),
        walker.root().display(),
        report.collisions,
        report.skipped
    );
    Ok(report)
}

fn rename_one(
    directory: &Path,
    file: &FileIdentity,
    pattern: &Regex,
    replacement: &str,
) -> FileOutcome<Option<RenameOperation>> {
    let old_name = file
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SkipReason::InvalidName(file.path.display().to_string()))?;

    let new_name = pattern.replace_all(old_name, replacement).into_owned();
    if new_name == old_name {
        return Ok(None);
    }
    if !is_plain_file_name(&new_name) {
        return Err(SkipReason::InvalidName(new_name));
    }

    let new_path = directory.join(&new_name);
    // symlink_metadata also sees dangling links, which rename would replace
    if fs::symlink_metadata(&new_path).is_ok() {
        return Err(SkipReason::Collision(new_path));
    }

    fs::rename(&file.path, &new_path).map_err(|e| SkipReason::io(&file.path, e))?;
    Ok(Some(RenameOperation {
        directory: directory.to_path_buf(),
        old_name: old_name.to_string(),
        new_name,
    }))
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains(std::path::MAIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rename(dir: &Path, request: &RenameRequest) -> RenameReport {
        batch_rename(dir, request, &EngineOptions::default()).unwrap()
    }

    #[test]
    fn test_simple_substitution() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("report_draft.txt"), "x").unwrap();

        let report = rename(temp_dir.path(), &RenameRequest::new("draft", "final"));

        assert_eq!(report.operations.len(), 1);
        assert_eq!(report.operations[0].old_name, "report_draft.txt");
        assert_eq!(report.operations[0].new_name, "report_final.txt");
        assert!(temp_dir.path().join("report_final.txt").is_file());
        assert!(!temp_dir.path().join("report_draft.txt").exists());
    }

    #[test]
    fn test_no_match_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "x").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "x").unwrap();

        let report = rename(temp_dir.path(), &RenameRequest::new("zzz", "y"));
        assert!(report.operations.is_empty());
        assert_eq!(report.collisions, 0);
    }

    #[test]
    fn test_collision_leaves_file_alone() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("old.txt"), "old").unwrap();
        fs::write(temp_dir.path().join("new.txt"), "keep me").unwrap();

        let report = rename(temp_dir.path(), &RenameRequest::new("old", "new"));

        assert!(report.operations.is_empty());
        assert_eq!(report.collisions, 1);
        assert_eq!(fs::read_to_string(temp_dir.path().join("new.txt")).unwrap(), "keep me");
        assert_eq!(fs::read_to_string(temp_dir.path().join("old.txt")).unwrap(), "old");
    }

    #[test]
    fn test_capture_groups_in_replacement() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("IMG_2024.jpg"), "x").unwrap();

        let report = rename(
            temp_dir.path(),
            &RenameRequest::new(r"IMG_(\d+)", "photo-$1"),
        );
        assert_eq!(report.operations[0].new_name, "photo-2024.jpg");
    }

    #[test]
    fn test_extension_filter() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("v1.txt"), "x").unwrap();
        fs::write(temp_dir.path().join("v1.MD"), "x").unwrap();
        fs::write(temp_dir.path().join("v1.py"), "x").unwrap();

        let request = RenameRequest::new("v1", "v2").with_extensions("txt, .md");
        let report = rename(temp_dir.path(), &request);

        let mut renamed: Vec<_> = report.operations.iter().map(|op| op.new_name.clone()).collect();
        renamed.sort();
        assert_eq!(renamed, vec!["v2.MD", "v2.txt"]);
        assert!(temp_dir.path().join("v1.py").exists());
    }

    #[test]
    fn test_nested_files_untouched() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("draft_dir")).unwrap();
        fs::write(temp_dir.path().join("draft_dir/draft.txt"), "x").unwrap();

        let report = rename(temp_dir.path(), &RenameRequest::new("draft", "final"));
        assert!(report.operations.is_empty());
        assert!(temp_dir.path().join("draft_dir/draft.txt").exists());
    }

    #[test]
    fn test_separator_in_new_name_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a-b.txt"), "x").unwrap();

        let report = rename(temp_dir.path(), &RenameRequest::new("-", "/"));
        assert!(report.operations.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let err = batch_rename(
            temp_dir.path(),
            &RenameRequest::new("(unclosed", "x"),
            &EngineOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, OrganizeError::InvalidPattern { .. }));
    }
}
