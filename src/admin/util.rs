use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::admin::error::{AdminError, Result};
use crate::db::{load_config, StoreConfig};
use crate::storage::bucket::OWNER_FILE;
use crate::types::UserId;

/// A user directory discovered under a store root.
#[derive(Clone, Debug)]
pub struct UserEntry {
    /// Identifier recorded in the directory's owner marker.
    pub id: UserId,
    /// Name of the bucket directory containing it.
    pub bucket: String,
    /// The user's own directory.
    pub dir: PathBuf,
}

/// Everything found by walking a store root.
#[derive(Clone, Debug)]
pub struct StoreLayout {
    /// Persisted config of the root.
    pub config: StoreConfig,
    /// Number of bucket directories.
    pub buckets: usize,
    /// User directories with a readable owner marker, in path order.
    pub users: Vec<UserEntry>,
    /// User directories with a missing or unreadable owner marker.
    pub orphans: Vec<PathBuf>,
}

/// Loads the config of an existing store without modifying it.
///
/// # Errors
///
/// Returns [`AdminError::MissingStore`] if `root` is not a directory or has
/// no config record.
pub fn open_store(root: &Path) -> Result<StoreConfig> {
    if !root.is_dir() {
        return Err(AdminError::missing_store(root));
    }
    load_config(root)?.ok_or_else(|| AdminError::missing_store(root))
}

/// Walks every bucket and user directory under `root`.
///
/// # Errors
///
/// Returns [`AdminError::MissingStore`] if `root` is not a store, or an I/O
/// error if a directory cannot be listed.
pub fn scan_store(root: &Path) -> Result<StoreLayout> {
    let config = open_store(root)?;
    let mut layout = StoreLayout {
        config,
        buckets: 0,
        users: Vec::new(),
        orphans: Vec::new(),
    };
    for bucket in sorted_dirs(root)? {
        layout.buckets += 1;
        let bucket_name = file_name(&bucket);
        for dir in sorted_dirs(&bucket)? {
            match fs::read(dir.join(OWNER_FILE)) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(id) => layout.users.push(UserEntry {
                        id: UserId::new(id),
                        bucket: bucket_name.clone(),
                        dir,
                    }),
                    Err(_) => layout.orphans.push(dir),
                },
                Err(e) if e.kind() == ErrorKind::NotFound => layout.orphans.push(dir),
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(layout)
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sorted_dirs(path: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}
