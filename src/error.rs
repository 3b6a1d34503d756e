//! Error types for store, log and configuration operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::UserId;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, FriendlyError>;

/// Errors raised by the store.
#[derive(Debug, Error)]
pub enum FriendlyError {
    /// Invalid options, or options that conflict with the persisted config.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// An I/O operation on `path` failed.
    #[error("storage error at {path}: {source}")]
    Storage {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The store root exists but is not a directory.
    #[error("the path '{0}' is not a directory and can't be written to")]
    NotADirectory(PathBuf),
    /// A log line could not be decoded.
    #[error(transparent)]
    RecordParse(#[from] RecordParseError),
    /// The config record could not be encoded or decoded.
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The primary side of an edge was written but the mirror write kept failing.
    #[error("edge {user} -> {other} is one-sided: {source}")]
    PartialEdge {
        /// User whose `following` log was written.
        user: UserId,
        /// User whose `followers` log is missing the record.
        other: UserId,
        /// Error from the last mirror attempt.
        #[source]
        source: Box<FriendlyError>,
    },
}

impl FriendlyError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        FriendlyError::Configuration(message.into())
    }

    pub(crate) fn storage(path: impl AsRef<Path>, source: io::Error) -> Self {
        FriendlyError::Storage {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this is a [`FriendlyError::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, FriendlyError::Configuration(_))
    }

    /// Whether this is a storage failure, including a non-directory root.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            FriendlyError::Storage { .. } | FriendlyError::NotADirectory(_)
        )
    }
}

/// A single log line that could not be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed record on line {line}: {reason}")]
pub struct RecordParseError {
    /// One-based line number within the log.
    pub line: usize,
    /// What was wrong with the line.
    pub reason: String,
}

impl RecordParseError {
    pub(crate) fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}
