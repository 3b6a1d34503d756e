//! Offline inspection of a store root.
//!
//! These functions walk the directory tree directly and never write: opening
//! a store through them does not refresh its config record.

mod error;
mod stats;
mod util;
mod verify;

/// Error types for administrative operations.
pub use error::{AdminError, Result};

/// Record and size statistics for a store.
pub use stats::{stats, StatsReport};

/// Store integrity verification.
///
/// Reports damage the store tolerates at read time (malformed lines,
/// one-sided edges) as well as unreachable user directories.
pub use verify::{verify, VerifyCounts, VerifyFinding, VerifyLevel, VerifyReport, VerifySeverity};

/// Directory walking helpers.
pub use util::{open_store, scan_store, StoreLayout, UserEntry};
