//! Relationship storage: bucketed directory layout, the append-only record
//! format, the fold that turns a log into a membership list, and the engines
//! built on top of them.

/// Hashed directory sharding of user identifiers.
pub mod bucket;

/// Reconstruction of active membership from raw history.
pub mod fold;

mod engine;
mod log;
mod memory;
mod metrics;
mod record;

pub use bucket::{BucketResolver, DEFAULT_HASH_WIDTH, MAX_HASH_WIDTH, MIN_HASH_WIDTH};
pub use engine::{LogEngine, Member, RelationshipEngine};
pub use fold::project_active_set;
pub use log::{read_log_file, History, RelationshipLog};
pub use memory::MemoryEngine;
pub use metrics::{default_metrics, CounterMetrics, MetricsSnapshot, NoopMetrics, StoreMetrics};
pub use record::{encode_record, parse_record, unix_timestamp, EventRecord};
