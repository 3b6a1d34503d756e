use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{trace, warn};

use crate::error::{FriendlyError, RecordParseError, Result};
use crate::storage::bucket::{BucketResolver, OWNER_FILE};
use crate::storage::metrics::StoreMetrics;
use crate::storage::record::{encode_record, parse_record, EventRecord};
use crate::types::{Action, Direction, UserId};

/// Records read back from one log, in append order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    /// Decoded records.
    pub records: Vec<EventRecord>,
    /// Lines that could not be decoded; they are left out of `records`.
    pub skipped: Vec<RecordParseError>,
}

impl History {
    /// Number of decoded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was decoded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-user append-only event logs laid out under a bucketed directory tree.
///
/// Each user has a `following` and a `followers` log holding one record per
/// line. Logs are only ever appended to; history is never rewritten.
/// Concurrent appenders to the same log are not coordinated.
#[derive(Clone)]
pub struct RelationshipLog {
    resolver: BucketResolver,
    separator: String,
    metrics: Arc<dyn StoreMetrics>,
}

impl RelationshipLog {
    /// Log store writing records joined by `separator`.
    pub fn new(
        resolver: BucketResolver,
        separator: impl Into<String>,
        metrics: Arc<dyn StoreMetrics>,
    ) -> Self {
        Self {
            resolver,
            separator: separator.into(),
            metrics,
        }
    }

    /// Resolver mapping users to directories.
    pub fn resolver(&self) -> &BucketResolver {
        &self.resolver
    }

    /// Field separator of every record.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Directory holding `user`'s logs and owner marker.
    pub fn user_dir(&self, user: &UserId) -> PathBuf {
        self.resolver.user_dir(user)
    }

    /// Path of `user`'s `direction` log.
    pub fn log_path(&self, user: &UserId, direction: Direction) -> PathBuf {
        self.user_dir(user).join(direction.file_name())
    }

    /// Creates the user's directory and both (empty) logs if missing.
    pub fn initialize(&self, user: &UserId) -> Result<()> {
        let dir = self.ensure_user_dir(user)?;
        for direction in Direction::ALL {
            let path = dir.join(direction.file_name());
            open_append(&path)?;
        }
        Ok(())
    }

    /// Appends `action` on `other` to the end of `user`'s `direction` log,
    /// creating the bucket directory and log as needed.
    pub fn append(
        &self,
        user: &UserId,
        direction: Direction,
        action: Action,
        other: &UserId,
    ) -> Result<EventRecord> {
        let record = EventRecord::now(action, other.clone());
        self.append_record(user, direction, &record)?;
        Ok(record)
    }

    /// Appends an already stamped record.
    pub fn append_record(
        &self,
        user: &UserId,
        direction: Direction,
        record: &EventRecord,
    ) -> Result<()> {
        let dir = self.ensure_user_dir(user)?;
        let path = dir.join(direction.file_name());
        let line = encode_record(record, &self.separator);
        let mut file = open_append(&path)?;
        file.write_all(line.as_bytes())
            .map_err(|e| FriendlyError::storage(&path, e))?;
        self.metrics.log_append(direction);
        trace!(
            user = %user,
            %direction,
            action = ?record.action,
            other = %record.other,
            "log.append"
        );
        Ok(())
    }

    /// Reads `user`'s `direction` log. A log that was never written reads as
    /// empty.
    pub fn read(&self, user: &UserId, direction: Direction) -> Result<History> {
        let path = self.log_path(user, direction);
        let history = read_log_file(&path, &self.separator)?;
        self.metrics.log_read(direction);
        for _ in &history.skipped {
            self.metrics.record_skipped();
        }
        Ok(history)
    }

    /// Removes both of `user`'s logs.
    pub fn purge(&self, user: &UserId) -> Result<()> {
        let dir = self.user_dir(user);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FriendlyError::storage(&dir, e)),
        }
    }

    /// Removes every bucket under the root, leaving the root itself in place.
    pub fn clear(&self) -> Result<()> {
        let root = self.resolver.root();
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(FriendlyError::storage(root, e)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| FriendlyError::storage(root, e))?;
            let path = entry.path();
            if path.is_dir() {
                fs::remove_dir_all(&path).map_err(|e| FriendlyError::storage(&path, e))?;
            }
        }
        Ok(())
    }

    fn ensure_user_dir(&self, user: &UserId) -> Result<PathBuf> {
        let dir = self.user_dir(user);
        if !dir.is_dir() {
            fs::create_dir_all(&dir).map_err(|e| FriendlyError::storage(&dir, e))?;
            let owner = dir.join(OWNER_FILE);
            fs::write(&owner, user.as_bytes()).map_err(|e| FriendlyError::storage(&owner, e))?;
        }
        Ok(dir)
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| FriendlyError::storage(path, e))
}

/// Decodes a log file at `path`, skipping (and reporting) malformed lines.
pub fn read_log_file(path: &Path, separator: &str) -> Result<History> {
    let mut bytes = Vec::new();
    match File::open(path) {
        Ok(mut file) => {
            file.read_to_end(&mut bytes)
                .map_err(|e| FriendlyError::storage(path, e))?;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(History::default()),
        Err(e) => return Err(FriendlyError::storage(path, e)),
    }

    let mut history = History::default();
    let mut lines = bytes.split(|b| *b == b'\n').enumerate().peekable();
    while let Some((idx, raw)) = lines.next() {
        if raw.is_empty() && lines.peek().is_none() {
            break;
        }
        let line_no = idx + 1;
        let parsed = std::str::from_utf8(raw)
            .map_err(|_| RecordParseError::new(line_no, "invalid utf-8"))
            .and_then(|line| parse_record(line_no, line, separator));
        match parsed {
            Ok(record) => history.records.push(record),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    line = err.line,
                    reason = %err.reason,
                    "log.record_skipped"
                );
                history.skipped.push(err);
            }
        }
    }
    Ok(history)
}
