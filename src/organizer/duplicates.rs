use super::digest::{digest_file, ContentDigest};
use super::error::OrganizeError;
use super::walker::{FileIdentity, TreeWalker};
use super::EngineOptions;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Files whose content hashed to the same digest. Always two or more.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub digest: ContentDigest,
    pub size: u64,
    /// Sorted by path.
    pub files: Vec<FileIdentity>,
}

impl DuplicateGroup {
    /// Bytes that would be reclaimed by keeping a single copy.
    pub fn wasted_bytes(&self) -> u64 {
        self.size * (self.files.len() as u64 - 1)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DuplicateReport {
    pub groups: Vec<DuplicateGroup>,
    /// Files at or above the size threshold that were submitted for hashing.
    pub files_scanned: usize,
    /// Files dropped because they could not be stat'd or hashed.
    pub skipped: usize,
}

impl DuplicateReport {
    pub fn duplicate_files(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }

    pub fn wasted_bytes(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_bytes).sum()
    }
}

// Size is part of the key so a group can never mix sizes, even if a file
// changes between the walk and the hash.
type GroupKey = (ContentDigest, u64);
type GroupMap = HashMap<GroupKey, Vec<FileIdentity>>;

/// Group every file under `root` of at least `min_size` bytes by content.
///
/// A single walk feeds the worker pool; each worker folds into its own map
/// and the maps are merged at the end, so grouping does not depend on the
/// order files are discovered or hashed in.
pub fn find_duplicates(
    root: impl AsRef<Path>,
    min_size: u64,
    options: &EngineOptions,
) -> Result<DuplicateReport, OrganizeError> {
    let walker = TreeWalker::new(root)?;
    let pool = options.thread_pool()?;
    let cancel = &options.cancel;
    let block_size = options.block_size;

    let scanned = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let by_digest: GroupMap = pool.install(|| {
        walker
            .files()
            .take_while(|_| !cancel.is_cancelled())
            .filter(|file| file.size >= min_size)
            .par_bridge()
            .filter_map(|file| {
                if cancel.is_cancelled() {
                    return None;
                }
                scanned.fetch_add(1, Ordering::Relaxed);
                match digest_file(&file.path, block_size) {
                    Ok(digest) => Some(((digest, file.size), file)),
                    Err(reason) => {
                        log::debug!("Excluding from duplicate scan: {}", reason);
                        failed.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                }
            })
            .fold(HashMap::new, |mut map: GroupMap, (key, file)| {
                map.entry(key).or_default().push(file);
                map
            })
            .reduce(HashMap::new, |mut left, right| {
                for (key, files) in right {
                    left.entry(key).or_default().extend(files);
                }
                left
            })
    });

    cancel.check()?;

    let mut groups: Vec<DuplicateGroup> = by_digest
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|((digest, size), mut files)| {
            files.sort_by(|a, b| a.path.cmp(&b.path));
            DuplicateGroup {
                digest,
                size,
                files,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.size
            .cmp(&a.size)
            .then_with(|| a.files[0].path.cmp(&b.files[0].path))
    });

    let report = DuplicateReport {
        groups,
        files_scanned: scanned.into_inner(),
        skipped: failed.into_inner() + walker.skipped(),
    };

    log::info!(
        "Duplicate scan of {} complete: {} group(s), {} file(s) scanned, {} skipped",
        walker.root().display(),
        report.groups.len(),
        report.files_scanned,
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organizer::CancelToken;
    use std::fs;
    use tempfile::TempDir;

    fn group_names(group: &DuplicateGroup) -> Vec<String> {
        group.files.iter().map(|f| f.file_name()).collect()
    }

    #[test]
    fn test_identical_files_grouped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "X").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "X").unwrap();
        fs::write(temp_dir.path().join("c.txt"), "Y").unwrap();

        let report = find_duplicates(temp_dir.path(), 0, &EngineOptions::default()).unwrap();
        assert_eq!(report.files_scanned, 3);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(group_names(&report.groups[0]), vec!["a.txt", "b.txt"]);
        assert_eq!(report.groups[0].size, 1);
    }

    #[test]
    fn test_identical_files_across_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("one/two")).unwrap();
        fs::write(temp_dir.path().join("root.bin"), "same bytes").unwrap();
        fs::write(temp_dir.path().join("one/copy.bin"), "same bytes").unwrap();
        fs::write(temp_dir.path().join("one/two/copy.dat"), "same bytes").unwrap();

        let report = find_duplicates(temp_dir.path(), 0, &EngineOptions::default()).unwrap();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].files.len(), 3);
        assert_eq!(report.groups[0].wasted_bytes(), 20);
    }

    #[test]
    fn test_min_size_excludes_small_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("tiny1"), "ab").unwrap();
        fs::write(temp_dir.path().join("tiny2"), "ab").unwrap();
        fs::write(temp_dir.path().join("big1"), "abcdef").unwrap();
        fs::write(temp_dir.path().join("big2"), "abcdef").unwrap();

        let report = find_duplicates(temp_dir.path(), 3, &EngineOptions::default()).unwrap();
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.groups.len(), 1);
        assert!(report.groups[0].files.iter().all(|f| f.size >= 3));
    }

    #[test]
    fn test_no_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("one"), "1").unwrap();
        fs::write(temp_dir.path().join("two"), "2").unwrap();

        let report = find_duplicates(temp_dir.path(), 0, &EngineOptions::default()).unwrap();
        assert!(report.groups.is_empty());
        assert_eq!(report.files_scanned, 2);
    }

    #[test]
    fn test_worker_count_does_not_change_groups() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..40 {
            let content = format!("content-{}", i % 5);
            fs::write(temp_dir.path().join(format!("f{:02}.txt", i)), content).unwrap();
        }

        let single = EngineOptions {
            workers: 1,
            ..EngineOptions::default()
        };
        let many = EngineOptions {
            workers: 8,
            ..EngineOptions::default()
        };

        let a = find_duplicates(temp_dir.path(), 0, &single).unwrap();
        let b = find_duplicates(temp_dir.path(), 0, &many).unwrap();
        assert_eq!(a.groups.len(), 5);
        let names_a: Vec<_> = a.groups.iter().map(group_names).collect();
        let names_b: Vec<_> = b.groups.iter().map(group_names).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn test_cancelled_scan_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a"), "x").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let options = EngineOptions {
            cancel,
            ..EngineOptions::default()
        };
        let err = find_duplicates(temp_dir.path(), 0, &options).unwrap_err();
        assert!(matches!(err, OrganizeError::Cancelled));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped_not_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "X").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "X").unwrap();
        let locked = temp_dir.path().join("locked.txt");
        fs::write(&locked, "X").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::File::open(&locked).is_ok() {
            // running as root; permissions are not enforced
            return;
        }

        let report = find_duplicates(temp_dir.path(), 0, &EngineOptions::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        let report = report.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(group_names(&report.groups[0]), vec!["a.txt", "b.txt"]);
    }
}
