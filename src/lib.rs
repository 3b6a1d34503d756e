//! FriendlyDB: a small following/followers database.
//!
//! Every user owns two append-only event logs, `following` and `followers`,
//! stored under a hashed bucket directory. Current membership is never
//! stored; it is folded from the log on read.
//!
//! ```no_run
//! use friendlydb::{FriendlyDb, StoreOptions};
//!
//! # fn main() -> friendlydb::Result<()> {
//! let db = FriendlyDb::open("/tmp/friendly", StoreOptions::default())?;
//! let daniel = db.lookup("daniel");
//! daniel.follow("alice")?;
//! assert!(daniel.is_following("alice")?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod admin;
pub mod db;
pub mod error;
pub mod logging;
pub mod storage;
pub mod types;

pub use db::{DeleteReport, EdgeWriteMode, FriendlyDb, StoreConfig, StoreOptions, User};
pub use error::{FriendlyError, RecordParseError, Result};
pub use storage::{LogEngine, MemoryEngine, RelationshipEngine};
pub use types::{Action, Direction, UserId};
