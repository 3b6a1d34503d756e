use std::path::{Path, PathBuf};

use crate::error::FriendlyError;
use thiserror::Error;

/// Error type for administrative operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No store (root directory with a config record) at the given path.
    #[error("store not found: {0}")]
    MissingStore(PathBuf),
    /// Core store error.
    #[error(transparent)]
    Core(#[from] FriendlyError),
    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for administrative operations.
pub type Result<T> = std::result::Result<T, AdminError>;

impl AdminError {
    pub(crate) fn missing_store(path: impl AsRef<Path>) -> Self {
        AdminError::MissingStore(path.as_ref().to_path_buf())
    }
}
