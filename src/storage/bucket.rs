use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{FriendlyError, Result};
use crate::types::UserId;

/// Smallest accepted bucket width, in hex characters.
pub const MIN_HASH_WIDTH: usize = 1;
/// Largest accepted bucket width, in hex characters.
pub const MAX_HASH_WIDTH: usize = 32;
/// Bucket width used when none is configured.
pub const DEFAULT_HASH_WIDTH: usize = 6;

/// Name of the per-user marker file holding the raw identifier.
pub(crate) const OWNER_FILE: &str = "user";

/// Lowercase hex SHA-256 of the identifier's raw bytes.
pub fn user_digest(user: &UserId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user.as_bytes());
    hex::encode(hasher.finalize())
}

/// Maps user identifiers to their bucket directory under a store root.
///
/// The bucket is the first `width` hex characters of the user's digest, so
/// the fan-out of the root directory is bounded by `16^width`. Several users
/// can share a bucket; each one gets its own directory inside it, named by
/// the full digest.
#[derive(Clone, Debug)]
pub struct BucketResolver {
    root: PathBuf,
    width: usize,
}

impl BucketResolver {
    /// Builds a resolver, rejecting widths outside `1..=32` and an empty
    /// separator.
    pub fn new(root: impl Into<PathBuf>, width: usize, separator: &str) -> Result<Self> {
        validate_width(width)?;
        if separator.is_empty() {
            return Err(FriendlyError::config(
                "separator must be a string of at least 1 character",
            ));
        }
        Ok(Self {
            root: root.into(),
            width,
        })
    }

    /// Bucket width in hex characters.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Store root the buckets live under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stable bucket token for `user`.
    pub fn bucket(&self, user: &UserId) -> String {
        let mut digest = user_digest(user);
        digest.truncate(self.width);
        digest
    }

    /// Directory owning both of `user`'s logs.
    pub fn user_dir(&self, user: &UserId) -> PathBuf {
        let digest = user_digest(user);
        self.root.join(&digest[..self.width]).join(digest)
    }
}

pub(crate) fn validate_width(width: usize) -> Result<()> {
    if !(MIN_HASH_WIDTH..=MAX_HASH_WIDTH).contains(&width) {
        return Err(FriendlyError::config(format!(
            "hash width must be between {MIN_HASH_WIDTH} and {MAX_HASH_WIDTH}, got {width}"
        )));
    }
    Ok(())
}
