use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::storage::bucket::BucketResolver;
use crate::storage::fold::project_active_set;
use crate::storage::log::{History, RelationshipLog};
use crate::storage::metrics::StoreMetrics;
use crate::types::{Action, Direction, UserId};

/// One currently active member of a relationship list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Member {
    /// The member's identifier.
    pub user: UserId,
    /// When the edge was last added, for engines that keep it.
    pub followed_on: Option<f64>,
}

/// Storage capability behind the relationship API.
///
/// Engines agree on membership semantics but not on ordering: the log engine
/// returns members in first-appearance order while score-based engines return
/// the most recently added first. Callers must not rely on one ordering
/// across engines.
pub trait RelationshipEngine: Send + Sync {
    /// Records one edit of `user`'s `direction` list.
    fn append(
        &self,
        user: &UserId,
        direction: Direction,
        action: Action,
        other: &UserId,
    ) -> Result<()>;

    /// Currently active members of `user`'s `direction` list.
    fn members(&self, user: &UserId, direction: Direction) -> Result<Vec<Member>>;

    /// Whether `other` is currently in `user`'s `direction` list.
    fn contains(&self, user: &UserId, direction: Direction, other: &str) -> Result<bool> {
        Ok(self
            .members(user, direction)?
            .iter()
            .any(|member| member.user == other))
    }

    /// Prepares storage for `user` ahead of the first write.
    fn initialize(&self, _user: &UserId) -> Result<()> {
        Ok(())
    }

    /// Drops both of `user`'s lists.
    fn purge(&self, user: &UserId) -> Result<()>;

    /// Drops every list held by the engine.
    fn clear(&self) -> Result<()>;
}

/// File-backed engine over per-user append-only logs.
#[derive(Clone)]
pub struct LogEngine {
    log: RelationshipLog,
}

impl LogEngine {
    /// Engine over the logs laid out by `resolver`.
    pub fn new(
        resolver: BucketResolver,
        separator: impl Into<String>,
        metrics: Arc<dyn StoreMetrics>,
    ) -> Self {
        Self {
            log: RelationshipLog::new(resolver, separator, metrics),
        }
    }

    /// The underlying log store.
    pub fn log(&self) -> &RelationshipLog {
        &self.log
    }

    /// Raw edit history of `user`'s `direction` log.
    pub fn history(&self, user: &UserId, direction: Direction) -> Result<History> {
        self.log.read(user, direction)
    }

    /// Folded active set of `user`'s `direction` log.
    pub fn active(&self, user: &UserId, direction: Direction) -> Result<Vec<UserId>> {
        let history = self.log.read(user, direction)?;
        Ok(project_active_set(&history.records))
    }
}

impl RelationshipEngine for LogEngine {
    fn append(
        &self,
        user: &UserId,
        direction: Direction,
        action: Action,
        other: &UserId,
    ) -> Result<()> {
        self.log.append(user, direction, action, other).map(|_| ())
    }

    fn members(&self, user: &UserId, direction: Direction) -> Result<Vec<Member>> {
        Ok(self
            .active(user, direction)?
            .into_iter()
            .map(|user| Member {
                user,
                followed_on: None,
            })
            .collect())
    }

    fn initialize(&self, user: &UserId) -> Result<()> {
        self.log.initialize(user)
    }

    fn purge(&self, user: &UserId) -> Result<()> {
        self.log.purge(user)
    }

    fn clear(&self) -> Result<()> {
        self.log.clear()
    }
}
