use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::db::config::{check_compatible, write_config, StoreConfig};
use crate::db::options::StoreOptions;
use crate::db::user::{DeleteReport, User};
use crate::error::{FriendlyError, Result};
use crate::storage::{BucketResolver, LogEngine, RelationshipEngine};
use crate::types::UserId;

/// A following/followers database rooted at one directory.
///
/// The store owns the root, validates and persists its config on open, and
/// hands out per-user [`User`] handles. It holds no per-user state itself.
pub struct FriendlyDb {
    root: PathBuf,
    options: StoreOptions,
    config: StoreConfig,
    engine: LogEngine,
}

impl FriendlyDb {
    /// Opens (creating if needed) the store at `root`.
    ///
    /// # Errors
    ///
    /// * [`FriendlyError::Configuration`] for invalid options, or when the
    ///   root was created with a different separator. Existing data is left
    ///   untouched in that case.
    /// * [`FriendlyError::NotADirectory`] when `root` exists but is not a
    ///   directory, and [`FriendlyError::Storage`] for I/O failures.
    pub fn open(root: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        options.validate()?;
        let root = root.as_ref().to_path_buf();
        let config = setup(&root, &options.separator)?;
        let resolver = BucketResolver::new(&root, options.hash_width, &options.separator)?;
        let engine = LogEngine::new(
            resolver,
            options.separator.clone(),
            options.metrics.clone(),
        );
        info!(
            root = %root.display(),
            hash_width = options.hash_width,
            separator = %options.separator,
            "store.open"
        );
        Ok(Self {
            root,
            options,
            config,
            engine,
        })
    }

    /// Opens `root` with default options.
    pub fn open_default(root: impl AsRef<Path>) -> Result<Self> {
        Self::open(root, StoreOptions::default())
    }

    /// Directory the store lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Options the store was opened with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Config record written when this store was opened.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The file engine backing every handle from [`FriendlyDb::lookup`].
    pub fn engine(&self) -> &LogEngine {
        &self.engine
    }

    /// Handle for `user`. Nothing is read or written until it is used.
    pub fn lookup(&self, user: impl Into<UserId>) -> User<'_, LogEngine> {
        User::new(&self.engine, user)
            .with_write_mode(self.options.edge_write_mode)
            .with_metrics(self.options.metrics.clone())
    }

    /// Directory holding `user`'s logs.
    pub fn user_dir(&self, user: impl Into<UserId>) -> PathBuf {
        self.engine.log().user_dir(&user.into())
    }

    /// Removes every edge touching `user` and drops their logs.
    pub fn delete_user(&self, user: impl Into<UserId>) -> Result<DeleteReport> {
        self.lookup(user).delete()
    }

    /// Destroys all persisted data and re-initialises an empty store.
    pub fn clear(&mut self) -> Result<()> {
        self.engine.clear()?;
        self.config = setup(&self.root, &self.options.separator)?;
        info!(root = %self.root.display(), "store.clear");
        Ok(())
    }
}

fn setup(root: &Path, separator: &str) -> Result<StoreConfig> {
    if !root.exists() {
        fs::create_dir_all(root).map_err(|e| FriendlyError::storage(root, e))?;
    }
    if !root.is_dir() {
        return Err(FriendlyError::NotADirectory(root.to_path_buf()));
    }
    check_compatible(root, separator)?;
    write_config(root, separator)
}
