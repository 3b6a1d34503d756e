use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::db::StoreConfig;
use crate::storage::read_log_file;
use crate::types::Direction;
use serde::Serialize;

use crate::admin::util::scan_store;
use crate::admin::Result;

/// Summary of a store root.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// The inspected root, as displayed.
    pub root: String,
    /// Persisted config record.
    pub config: StoreConfig,
    /// Bucket directories under the root.
    pub buckets: usize,
    /// User directories with an owner marker.
    pub users: usize,
    /// Decoded records across all `following` logs.
    pub following_records: u64,
    /// Decoded records across all `followers` logs.
    pub followers_records: u64,
    /// Lines that failed to decode, in either direction.
    pub malformed_records: u64,
    /// Total size of all logs on disk.
    pub log_bytes: u64,
}

/// Collects [`StatsReport`] for the store at `root` without modifying it.
///
/// # Errors
///
/// Returns [`crate::admin::AdminError::MissingStore`] if `root` is not a
/// store, or the first I/O error other than a missing log.
pub fn stats(root: impl AsRef<Path>) -> Result<StatsReport> {
    let root = root.as_ref();
    let layout = scan_store(root)?;
    let separator = layout.config.separator.clone();
    let mut report = StatsReport {
        root: root.display().to_string(),
        config: layout.config,
        buckets: layout.buckets,
        users: layout.users.len(),
        following_records: 0,
        followers_records: 0,
        malformed_records: 0,
        log_bytes: 0,
    };

    for user in &layout.users {
        for direction in Direction::ALL {
            let path = user.dir.join(direction.file_name());
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            report.log_bytes += meta.len();
            let history = read_log_file(&path, &separator)?;
            let records = history.records.len() as u64;
            match direction {
                Direction::Following => report.following_records += records,
                Direction::Followers => report.followers_records += records,
            }
            report.malformed_records += history.skipped.len() as u64;
        }
    }
    Ok(report)
}
