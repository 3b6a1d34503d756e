//! The per-root config record and its compatibility rules.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FriendlyError, Result};
use crate::storage::unix_timestamp;

/// On-disk format written by this version of the crate.
pub const FORMAT_VERSION: u32 = 1;

/// Name of the config record inside a store root.
pub const CONFIG_FILE: &str = "config";

/// Settings persisted once per store root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Separator every log under the root was written with.
    pub separator: String,
    /// On-disk format of the root.
    pub format_version: u32,
    /// Seconds since the Unix epoch at which the store was last opened.
    pub last_opened_at: f64,
}

/// Config record as found on disk; older writers may have left keys out.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    separator: Option<String>,
    format_version: Option<u32>,
    last_opened_at: Option<f64>,
}

/// Location of the config record under `root`.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Reads the persisted config, or `None` when the root has none yet.
pub fn load_config(root: &Path) -> Result<Option<StoreConfig>> {
    let Some(raw) = read_raw(root)? else {
        return Ok(None);
    };
    Ok(Some(StoreConfig {
        separator: raw.separator.unwrap_or_default(),
        format_version: raw.format_version.unwrap_or(FORMAT_VERSION),
        last_opened_at: raw.last_opened_at.unwrap_or_default(),
    }))
}

/// Checks a persisted config (if any) against the requested separator.
///
/// A missing `separator` key is accepted; anything else that differs, or a
/// format newer than this crate understands, is rejected without touching
/// the stored data.
pub(crate) fn check_compatible(root: &Path, separator: &str) -> Result<()> {
    let Some(raw) = read_raw(root)? else {
        return Ok(());
    };
    if let Some(existing) = raw.separator.as_deref() {
        if existing != separator {
            return Err(FriendlyError::config(format!(
                "the pre-existing separator '{existing}' doesn't match the current separator \
                 '{separator}'; data files would be unusable and require migration"
            )));
        }
    }
    if let Some(version) = raw.format_version {
        if version > FORMAT_VERSION {
            return Err(FriendlyError::config(format!(
                "store format version {version} is newer than supported version {FORMAT_VERSION}"
            )));
        }
    }
    Ok(())
}

/// Writes a fresh config record for `separator`, stamping the open time.
pub(crate) fn write_config(root: &Path, separator: &str) -> Result<StoreConfig> {
    let config = StoreConfig {
        separator: separator.to_string(),
        format_version: FORMAT_VERSION,
        last_opened_at: unix_timestamp(),
    };
    let path = config_path(root);
    let serialized = serde_json::to_vec(&config)?;
    fs::write(&path, serialized).map_err(|e| FriendlyError::storage(&path, e))?;
    Ok(config)
}

fn read_raw(root: &Path) -> Result<Option<RawConfig>> {
    let path = config_path(root);
    let contents = match fs::read(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FriendlyError::storage(&path, e)),
    };
    Ok(Some(serde_json::from_slice(&contents)?))
}
