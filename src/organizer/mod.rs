//! Content-addressed organization engine.
//!
//! Every operation walks the tree fresh; nothing is cached between calls.
//! Directory-level problems abort with [`OrganizeError`], while per-file
//! problems are tallied and the file is left out of the result.

pub mod category;
pub mod digest;
pub mod duplicates;
pub mod error;
pub mod organize;
pub mod rename;
pub mod stats;
pub mod walker;

pub use category::{Category, CategoryTable, CATEGORY_TABLE};
pub use digest::{digest_file, ContentDigest, DEFAULT_BLOCK_SIZE};
pub use duplicates::{find_duplicates, DuplicateGroup, DuplicateReport};
pub use error::{FileOutcome, OrganizeError, SkipReason};
pub use organize::{organize_by_type, OrganizeReport, Placement};
pub use rename::{batch_rename, RenameOperation, RenameReport, RenameRequest};
pub use stats::{directory_statistics, DirectoryStatistics, FileRecord, NO_EXTENSION};
pub use walker::{FileIdentity, TreeWalker, WalkEntry};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Caller-driven cancellation, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), OrganizeError> {
        if self.is_cancelled() {
            Err(OrganizeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Knobs shared by every engine operation.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub block_size: usize,
    /// Worker threads for hashing and copying; 0 means one per core.
    pub workers: usize,
    pub cancel: CancelToken,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            workers: 0,
            cancel: CancelToken::new(),
        }
    }
}

impl EngineOptions {
    pub(crate) fn thread_pool(&self) -> Result<rayon::ThreadPool, OrganizeError> {
        Ok(rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?)
    }
}
