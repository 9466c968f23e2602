use super::error::OrganizeError;
use super::walker::{FileIdentity, TreeWalker, WalkEntry};
use super::EngineOptions;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Histogram bucket for files without an extension.
pub const NO_EXTENSION: &str = "No extension";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl From<&FileIdentity> for FileRecord {
    fn from(file: &FileIdentity) -> Self {
        Self {
            path: file.path.clone(),
            size: file.size,
            modified: file.modified,
        }
    }
}

/// Totals for one tree. The extremal records are `None` only when the tree
/// holds no files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryStatistics {
    pub root: PathBuf,
    pub total_files: u64,
    /// Directories below the root, root excluded.
    pub total_dirs: u64,
    pub total_size: u64,
    pub extensions: BTreeMap<String, u64>,
    pub largest: Option<FileRecord>,
    pub oldest: Option<FileRecord>,
    pub newest: Option<FileRecord>,
    pub skipped: usize,
}

impl DirectoryStatistics {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    fn record_file(&mut self, file: &FileIdentity) {
        self.total_files += 1;
        self.total_size += file.size;

        let bucket = if file.extension.is_empty() {
            NO_EXTENSION.to_string()
        } else {
            file.extension.clone()
        };
        *self.extensions.entry(bucket).or_insert(0) += 1;

        // Strict comparisons: on a tie the first file seen keeps the record.
        if self.largest.as_ref().map_or(true, |r| file.size > r.size) {
            self.largest = Some(file.into());
        }
        if self.oldest.as_ref().map_or(true, |r| file.modified < r.modified) {
            self.oldest = Some(file.into());
        }
        if self.newest.as_ref().map_or(true, |r| file.modified > r.modified) {
            self.newest = Some(file.into());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }

    /// The `limit` most common extensions, most common first; ties are
    /// ordered by extension.
    pub fn top_extensions(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut counts: Vec<(&str, u64)> = self
            .extensions
            .iter()
            .map(|(ext, count)| (ext.as_str(), *count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts.truncate(limit);
        counts
    }
}

/// Single walk over `root` collecting counts, sizes, an extension histogram
/// and the largest/oldest/newest files.
pub fn directory_statistics(
    root: impl AsRef<Path>,
    options: &EngineOptions,
) -> Result<DirectoryStatistics, OrganizeError> {
    let walker = TreeWalker::new(root)?;
    let mut stats = DirectoryStatistics::new(walker.root().to_path_buf());

    for entry in walker.entries() {
        options.cancel.check()?;
        match entry {
            WalkEntry::File(file) => stats.record_file(&file),
            WalkEntry::Directory(_) => stats.total_dirs += 1,
        }
    }
    stats.skipped = walker.skipped();

    log::info!(
        "Statistics for {}: {} file(s), {} dir(s), {} bytes",
        stats.root.display(),
        stats.total_files,
        stats.total_dirs,
        stats.total_size
    );
    Ok(stats)
}
