use super::error::{FileOutcome, OrganizeError, SkipReason};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

/// A regular file seen during a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIdentity {
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Utc>,
    /// Lower-cased with the leading dot (".png"), or empty.
    pub extension: String,
}

impl FileIdentity {
    pub fn from_path(path: impl AsRef<Path>) -> FileOutcome<Self> {
        let path = path.as_ref();
        let metadata = path.metadata().map_err(|e| SkipReason::io(path, e))?;
        Self::from_metadata(path.to_path_buf(), &metadata)
    }

    fn from_entry(entry: &DirEntry) -> FileOutcome<Self> {
        let metadata = entry.metadata().map_err(|e| SkipReason::io(entry.path(), e.into()))?;
        Self::from_metadata(entry.path().to_path_buf(), &metadata)
    }

    fn from_metadata(path: PathBuf, metadata: &Metadata) -> FileOutcome<Self> {
        let modified = metadata.modified().map_err(|e| SkipReason::io(&path, e))?;
        let extension = extension_of(&path);
        Ok(Self {
            size: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
            extension,
            path,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Lower-cased extension including the dot, empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub enum WalkEntry {
    File(FileIdentity),
    Directory(PathBuf),
}

/// Recursive enumeration of everything below a directory root.
///
/// Entries that cannot be read are dropped from the sequence and counted in
/// [`TreeWalker::skipped`]. Symlinks are not followed and never reported.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    max_depth: Option<usize>,
    skipped: Arc<AtomicUsize>,
}

impl TreeWalker {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, OrganizeError> {
        let root = require_directory(root.as_ref())?;
        Ok(Self {
            root,
            max_depth: None,
            skipped: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Restrict the walk to the immediate children of the root.
    pub fn single_level(mut self) -> Self {
        self.max_depth = Some(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entries dropped so far because they could not be read.
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Files and directories below the root, root excluded.
    pub fn entries(&self) -> impl Iterator<Item = WalkEntry> + Send + 'static {
        let mut walker = WalkDir::new(&self.root).min_depth(1).follow_links(false);
        if let Some(max_depth) = self.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let skipped = Arc::clone(&self.skipped);
        walker.into_iter().filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Walk error: {}", e);
                    skipped.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                return Some(WalkEntry::Directory(entry.into_path()));
            }
            if !file_type.is_file() {
                log::debug!("Not following {}", entry.path().display());
                return None;
            }

            match FileIdentity::from_entry(&entry) {
                Ok(identity) => Some(WalkEntry::File(identity)),
                Err(reason) => {
                    log::debug!("Skipping entry: {}", reason);
                    skipped.fetch_add(1, Ordering::Relaxed);
                    None
                }
            }
        })
    }

    /// Regular files below the root.
    pub fn files(&self) -> impl Iterator<Item = FileIdentity> + Send + 'static {
        self.entries().filter_map(|entry| match entry {
            WalkEntry::File(identity) => Some(identity),
            WalkEntry::Directory(_) => None,
        })
    }
}

/// Resolve `path` to an absolute directory path or fail with the matching
/// directory-level error.
pub fn require_directory(path: &Path) -> Result<PathBuf, OrganizeError> {
    if !path.exists() {
        return Err(OrganizeError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(OrganizeError::NotADirectory(path.to_path_buf()));
    }
    path.canonicalize().map_err(|source| OrganizeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(walker: &TreeWalker) -> Vec<String> {
        let mut names: Vec<String> = walker.files().map(|f| f.file_name()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_walk_recurses_into_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("a/b")).unwrap();
        fs::write(temp_dir.path().join("top.txt"), "1").unwrap();
        fs::write(temp_dir.path().join("a/mid.TXT"), "22").unwrap();
        fs::write(temp_dir.path().join("a/b/deep"), "333").unwrap();

        let walker = TreeWalker::new(temp_dir.path()).unwrap();
        assert_eq!(names(&walker), vec!["deep", "mid.TXT", "top.txt"]);

        let mid = walker.files().find(|f| f.file_name() == "mid.TXT").unwrap();
        assert_eq!(mid.size, 2);
        assert_eq!(mid.extension, ".txt");
        assert!(mid.path.is_absolute());
        assert_eq!(walker.skipped(), 0);
    }

    #[test]
    fn test_single_level_ignores_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("here.md"), "x").unwrap();
        fs::write(temp_dir.path().join("sub/there.md"), "x").unwrap();

        let walker = TreeWalker::new(temp_dir.path()).unwrap().single_level();
        assert_eq!(names(&walker), vec!["here.md"]);
    }

    #[test]
    fn test_entries_report_directories_without_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("x/y")).unwrap();

        let walker = TreeWalker::new(temp_dir.path()).unwrap();
        let dirs = walker
            .entries()
            .filter(|e| matches!(e, WalkEntry::Directory(_)))
            .count();
        assert_eq!(dirs, 2);
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = TreeWalker::new(temp_dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, OrganizeError::NotFound(_)));
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = TreeWalker::new(&file).unwrap_err();
        assert!(matches!(err, OrganizeError::NotADirectory(_)));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("photo.PNG")), ".png");
        assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
        assert_eq!(extension_of(Path::new("Makefile")), "");
        assert_eq!(extension_of(Path::new(".bashrc")), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("real.txt"), "x").unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("real.txt"),
            temp_dir.path().join("link.txt"),
        )
        .unwrap();

        let walker = TreeWalker::new(temp_dir.path()).unwrap();
        assert_eq!(names(&walker), vec!["real.txt"]);
        assert_eq!(walker.skipped(), 0);
    }
}
