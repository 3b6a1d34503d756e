//! Store facade and the per-user relationship API.

pub mod config;
mod options;
mod store;
mod user;


pub use config::{load_config, StoreConfig, CONFIG_FILE, FORMAT_VERSION};
pub use options::{EdgeWriteMode, StoreOptions, DEFAULT_SEPARATOR};
pub use store::FriendlyDb;
pub use user::{DeleteReport, User};
