use super::category::{Category, CategoryTable};
use super::error::{FileOutcome, OrganizeError, SkipReason};
use super::walker::{FileIdentity, TreeWalker};
use super::{CancelToken, EngineOptions};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: Category,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizeReport {
    /// Files successfully copied, per category. Categories with no copies
    /// are absent.
    pub placed: BTreeMap<Category, usize>,
    pub placements: Vec<Placement>,
    pub skipped: usize,
}

impl OrganizeReport {
    pub fn total_placed(&self) -> usize {
        self.placed.values().sum()
    }
}

#[derive(Default)]
struct CategoryOutcome {
    placements: Vec<Placement>,
    skipped: usize,
}

/// Copy every file under `source` into `<target>/<Category>/`.
///
/// Originals are left in place. Name clashes at the destination are resolved
/// as `<stem>_<n><ext>` with `n` counting up from 1. Categories are copied
/// in parallel, but each category directory has exactly one writer.
pub fn organize_by_type(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    table: &CategoryTable,
    options: &EngineOptions,
) -> Result<OrganizeReport, OrganizeError> {
    let walker = TreeWalker::new(source)?;
    let target = prepare_target(target.as_ref())?;
    let cancel = &options.cancel;

    // Category folders this run writes into; their contents are never
    // re-organized, even when the target is the source itself.
    let outputs: Vec<PathBuf> = Category::ALL
        .iter()
        .map(|category| target.join(category.label()))
        .collect();

    let mut plan: BTreeMap<Category, Vec<FileIdentity>> = BTreeMap::new();
    for file in walker.files() {
        cancel.check()?;
        if outputs.iter().any(|dir| file.path.starts_with(dir)) {
            continue;
        }
        plan.entry(table.categorize(&file.extension))
            .or_default()
            .push(file);
    }

    let pool = options.thread_pool()?;
    let outcomes: Vec<Result<(Category, CategoryOutcome), OrganizeError>> = pool.install(|| {
        plan.into_par_iter()
            .map(|(category, files)| {
                place_category(&target, category, files, cancel).map(|o| (category, o))
            })
            .collect()
    });

    let mut report = OrganizeReport {
        skipped: walker.skipped(),
        ..OrganizeReport::default()
    };
    for outcome in outcomes {
        let (category, outcome) = outcome?;
        if !outcome.placements.is_empty() {
            report.placed.insert(category, outcome.placements.len());
        }
        report.skipped += outcome.skipped;
        report.placements.extend(outcome.placements);
    }
    report.placements.sort_by(|a, b| a.source.cmp(&b.source));

    log::info!(
        "Organized {} file(s) into {} ({} skipped)",
        report.total_placed(),
        target.display(),
        report.skipped
    );
    Ok(report)
}

fn prepare_target(target: &Path) -> Result<PathBuf, OrganizeError> {
    if target.exists() && !target.is_dir() {
        return Err(OrganizeError::NotADirectory(target.to_path_buf()));
    }
    fs::create_dir_all(target)
        .and_then(|_| target.canonicalize())
        .map_err(|source| OrganizeError::Io {
            path: target.to_path_buf(),
            source,
        })
}

fn place_category(
    target: &Path,
    category: Category,
    mut files: Vec<FileIdentity>,
    cancel: &CancelToken,
) -> Result<CategoryOutcome, OrganizeError> {
    let dir = target.join(category.label());
    fs::create_dir_all(&dir).map_err(|source| OrganizeError::Io {
        path: dir.clone(),
        source,
    })?;

    // Path order decides which file keeps the bare name.
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut outcome = CategoryOutcome::default();
    for file in files {
        cancel.check()?;
        match copy_into(&file, &dir) {
            Ok(destination) => outcome.placements.push(Placement {
                source: file.path,
                destination,
                category,
            }),
            Err(reason) => {
                log::debug!("Not organizing {}: {}", file.path.display(), reason);
                outcome.skipped += 1;
            }
        }
    }
    Ok(outcome)
}

/// Copy `file` into `dir` under the first free name and return that path.
///
/// The destination is claimed with `create_new`, so an existing file is
/// never truncated even if it appeared after the plan was made.
fn copy_into(file: &FileIdentity, dir: &Path) -> FileOutcome<PathBuf> {
    let name = file
        .path
        .file_name()
        .ok_or_else(|| SkipReason::InvalidName(file.path.display().to_string()))?;
    let mut source = File::open(&file.path).map_err(|e| SkipReason::io(&file.path, e))?;

    let mut counter: u64 = 0;
    loop {
        let candidate = if counter == 0 {
            dir.join(name)
        } else {
            dir.join(suffixed_name(&file.path, counter))
        };

        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut destination) => {
                if let Err(e) = io::copy(&mut source, &mut destination) {
                    drop(destination);
                    let _ = fs::remove_file(&candidate);
                    return Err(SkipReason::io(&file.path, e));
                }
                preserve_metadata(file, &destination, &candidate);
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(SkipReason::io(&candidate, e)),
        }
    }
}

fn suffixed_name(path: &Path, counter: u64) -> String {
    let stem = path
        .file_stem()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, counter, ext.to_string_lossy()),
        None => format!("{}_{}", stem, counter),
    }
}

fn preserve_metadata(file: &FileIdentity, destination: &File, path: &Path) {
    if let Err(e) = destination.set_modified(SystemTime::from(file.modified)) {
        log::debug!("Could not carry mtime to {}: {}", path.display(), e);
    }
    match fs::metadata(&file.path) {
        Ok(metadata) => {
            if let Err(e) = fs::set_permissions(path, metadata.permissions()) {
                log::debug!("Could not carry permissions to {}: {}", path.display(), e);
            }
        }
        Err(e) => log::debug!("Could not re-read {}: {}", file.path.display(), e),
    }
}
