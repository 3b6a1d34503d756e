//! Subscriber setup for the `tracing` events emitted by the store.
//!
//! The library only emits events; embedders that have no subscriber of their
//! own can call [`init_logging`] once at startup.

use crate::error::{FriendlyError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `tracing` subscriber filtered by `level`.
///
/// `level` is any `EnvFilter` directive, e.g. `"info"` or
/// `"friendlydb=debug"`, so store events (`store.open`, `log.record_skipped`,
/// `user.delete.completed`) can be enabled without touching other crates.
///
/// # Errors
///
/// [`FriendlyError::Configuration`] for an unparsable directive or when a
/// global subscriber is already installed.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .map_err(|e| FriendlyError::config(format!("invalid log filter '{level}': {e}")))?;
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|_| FriendlyError::config("a global tracing subscriber is already installed"))
}
