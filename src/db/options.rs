use std::sync::Arc;

use crate::error::{FriendlyError, Result};
use crate::storage::bucket::validate_width;
use crate::storage::{default_metrics, StoreMetrics, DEFAULT_HASH_WIDTH};

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: &str = "::";

/// How the two writes making up one edge edit are carried out.
///
/// Neither mode makes the pair atomic and neither repairs a one-sided edge
/// left behind by an earlier failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeWriteMode {
    /// Write the user's log, then the other user's log, once each. A failure
    /// of the second write surfaces as the plain storage error.
    #[default]
    Independent,
    /// Retry the mirror write up to `attempts` more times, then report
    /// [`FriendlyError::PartialEdge`].
    RetrySecond {
        /// Extra attempts after the first failure.
        attempts: u32,
    },
}

/// Configuration options supplied when opening a [`super::FriendlyDb`].
#[derive(Clone)]
pub struct StoreOptions {
    /// Number of hex characters of the user digest used as the bucket name.
    pub hash_width: usize,
    /// Token joining the three fields of a record.
    pub separator: String,
    /// Behaviour of the mirror write of follow/unfollow.
    pub edge_write_mode: EdgeWriteMode,
    /// Metrics sink shared by the engine and every handle.
    pub metrics: Arc<dyn StoreMetrics>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            hash_width: DEFAULT_HASH_WIDTH,
            separator: DEFAULT_SEPARATOR.to_string(),
            edge_write_mode: EdgeWriteMode::Independent,
            metrics: default_metrics(),
        }
    }
}

impl StoreOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bucket width.
    pub fn hash_width(mut self, width: usize) -> Self {
        self.hash_width = width;
        self
    }

    /// Sets the record separator.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the edge write mode.
    pub fn edge_write_mode(mut self, mode: EdgeWriteMode) -> Self {
        self.edge_write_mode = mode;
        self
    }

    /// Installs a metrics sink.
    pub fn metrics(mut self, metrics: Arc<dyn StoreMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Checks the width range and that the separator can be embedded in a
    /// single-line record next to a decimal timestamp.
    pub fn validate(&self) -> Result<()> {
        validate_width(self.hash_width)?;
        let sep = self.separator.as_str();
        if sep.is_empty() {
            return Err(FriendlyError::config(
                "separator must be a string of at least 1 character",
            ));
        }
        if sep.contains(['\n', '\r']) {
            return Err(FriendlyError::config(
                "separator must not contain line breaks",
            ));
        }
        if sep.chars().any(|c| c.is_ascii_digit() || c == '.') {
            return Err(FriendlyError::config(format!(
                "separator '{sep}' must not contain digits or '.'"
            )));
        }
        Ok(())
    }
}
