use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Directory-level failures. Any of these aborts the whole operation.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid rename pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a single file was left out of a result.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("destination already exists: {}", .0.display())]
    Collision(PathBuf),

    #[error("substitution produced an unusable file name: '{0}'")]
    InvalidName(String),
}

impl SkipReason {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result of processing one file inside a batch.
pub type FileOutcome<T> = Result<T, SkipReason>;
