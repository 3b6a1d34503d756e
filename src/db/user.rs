use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::options::EdgeWriteMode;
use crate::error::{FriendlyError, Result};
use crate::storage::{default_metrics, History, LogEngine, RelationshipEngine, StoreMetrics};
use crate::types::{Action, Direction, UserId};

/// Outcome of [`User::delete`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    /// Users the deleted user was following.
    pub unfollowed: Vec<UserId>,
    /// Users that were following the deleted user.
    pub followers_removed: Vec<UserId>,
}

/// One user's view into a relationship engine.
///
/// A handle keeps the last projected `following`/`followers` lists in
/// memory. That cache is private to the handle: it is refreshed by the
/// `*_fresh` reads and never invalidated by writes, whether made through this
/// handle or any other. Handles are cheap to construct and are not `Sync`.
pub struct User<'e, E: RelationshipEngine + ?Sized = LogEngine> {
    id: UserId,
    engine: &'e E,
    write_mode: EdgeWriteMode,
    metrics: Arc<dyn StoreMetrics>,
    following: RefCell<Option<Vec<UserId>>>,
    followers: RefCell<Option<Vec<UserId>>>,
}

impl<'e, E: RelationshipEngine + ?Sized> User<'e, E> {
    /// Handle for `id` over `engine`, with independent edge writes and no
    /// metrics.
    pub fn new(engine: &'e E, id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            engine,
            write_mode: EdgeWriteMode::default(),
            metrics: default_metrics(),
            following: RefCell::new(None),
            followers: RefCell::new(None),
        }
    }

    /// Sets how the two writes of an edge edit are carried out.
    pub fn with_write_mode(mut self, mode: EdgeWriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Installs a metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn StoreMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The user this handle acts for.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Engine the handle reads and writes through.
    pub fn engine(&self) -> &'e E {
        self.engine
    }

    /// Creates this user's storage eagerly. Otherwise it is created by the
    /// first write that touches it.
    pub fn initialize(&self) -> Result<()> {
        self.engine.initialize(&self.id)
    }

    /// Re-reads the `following` list from storage and refreshes the cache.
    pub fn following_fresh(&self) -> Result<Vec<UserId>> {
        self.fresh(Direction::Following)
    }

    /// Returns the cached `following` list, reading storage only if nothing
    /// is cached yet. May be stale.
    pub fn following_cached(&self) -> Result<Vec<UserId>> {
        self.cached(Direction::Following)
    }

    /// `following_cached` when `use_cache` is set, `following_fresh` otherwise.
    pub fn following(&self, use_cache: bool) -> Result<Vec<UserId>> {
        if use_cache {
            self.following_cached()
        } else {
            self.following_fresh()
        }
    }

    /// Re-reads the `followers` list from storage and refreshes the cache.
    pub fn followers_fresh(&self) -> Result<Vec<UserId>> {
        self.fresh(Direction::Followers)
    }

    /// Cached `followers` list. May be stale.
    pub fn followers_cached(&self) -> Result<Vec<UserId>> {
        self.cached(Direction::Followers)
    }

    /// `followers_cached` when `use_cache` is set, `followers_fresh` otherwise.
    pub fn followers(&self, use_cache: bool) -> Result<Vec<UserId>> {
        if use_cache {
            self.followers_cached()
        } else {
            self.followers_fresh()
        }
    }

    /// Whether this user currently follows `other`. Always reads storage.
    pub fn is_following(&self, other: impl AsRef<str>) -> Result<bool> {
        self.engine
            .contains(&self.id, Direction::Following, other.as_ref())
    }

    /// Whether `other` currently follows this user. Always reads storage.
    pub fn is_followed_by(&self, other: impl AsRef<str>) -> Result<bool> {
        self.engine
            .contains(&self.id, Direction::Followers, other.as_ref())
    }

    /// Users that this user follows and that follow back, in `following`
    /// order.
    pub fn friends(&self) -> Result<Vec<UserId>> {
        let following = self.following_fresh()?;
        let followers = self.followers_fresh()?;
        let followers: HashSet<&str> = followers.iter().map(UserId::as_str).collect();
        Ok(following
            .into_iter()
            .filter(|id| followers.contains(id.as_str()))
            .collect())
    }

    /// Makes this user follow `other`. Returns `false` without writing
    /// anything when `other` is this user.
    pub fn follow(&self, other: impl Into<UserId>) -> Result<bool> {
        let other = other.into();
        if other == self.id {
            return Ok(false);
        }
        self.write_edge(&other, Action::Add)?;
        self.metrics.edge_followed();
        debug!(user = %self.id, other = %other, "user.follow");
        Ok(true)
    }

    /// Makes this user stop following `other`. The edge does not need to
    /// exist. Returns `false` without writing anything when `other` is this
    /// user.
    pub fn unfollow(&self, other: impl Into<UserId>) -> Result<bool> {
        let other = other.into();
        if other == self.id {
            return Ok(false);
        }
        self.write_edge(&other, Action::Remove)?;
        self.metrics.edge_unfollowed();
        debug!(user = %self.id, other = %other, "user.unfollow");
        Ok(true)
    }

    /// Removes every edge touching this user, then drops the user's own
    /// lists.
    ///
    /// Outgoing edges are removed by unfollowing each current target and
    /// incoming ones by having each current follower unfollow this user.
    /// Not transactional: a failure part way leaves the edges handled so far
    /// removed and the rest in place.
    pub fn delete(&self) -> Result<DeleteReport> {
        let following = self.following_fresh()?;
        let followers = self.followers_fresh()?;

        for target in &following {
            self.unfollow(target)?;
        }
        for follower in &followers {
            self.sibling(follower).unfollow(&self.id)?;
        }
        self.engine.purge(&self.id)?;
        self.following.replace(None);
        self.followers.replace(None);

        info!(
            user = %self.id,
            unfollowed = following.len(),
            followers_removed = followers.len(),
            "user.delete.completed"
        );
        Ok(DeleteReport {
            unfollowed: following,
            followers_removed: followers,
        })
    }

    fn sibling(&self, id: &UserId) -> User<'e, E> {
        User::new(self.engine, id.clone())
            .with_write_mode(self.write_mode)
            .with_metrics(Arc::clone(&self.metrics))
    }

    fn cache(&self, direction: Direction) -> &RefCell<Option<Vec<UserId>>> {
        match direction {
            Direction::Following => &self.following,
            Direction::Followers => &self.followers,
        }
    }

    fn fresh(&self, direction: Direction) -> Result<Vec<UserId>> {
        let members: Vec<UserId> = self
            .engine
            .members(&self.id, direction)?
            .into_iter()
            .map(|member| member.user)
            .collect();
        self.cache(direction).replace(Some(members.clone()));
        Ok(members)
    }

    fn cached(&self, direction: Direction) -> Result<Vec<UserId>> {
        if let Some(members) = self.cache(direction).borrow().as_ref() {
            self.metrics.cache_lookup(true);
            return Ok(members.clone());
        }
        self.metrics.cache_lookup(false);
        self.fresh(direction)
    }

    fn write_edge(&self, other: &UserId, action: Action) -> Result<()> {
        self.engine
            .append(&self.id, Direction::Following, action, other)?;
        let first = match self
            .engine
            .append(other, Direction::Followers, action, &self.id)
        {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        let EdgeWriteMode::RetrySecond { attempts } = self.write_mode else {
            return Err(first);
        };
        let mut last = first;
        for attempt in 1..=attempts {
            warn!(
                user = %self.id,
                other = %other,
                attempt,
                error = %last,
                "user.edge.mirror_retry"
            );
            match self
                .engine
                .append(other, Direction::Followers, action, &self.id)
            {
                Ok(()) => return Ok(()),
                Err(err) => last = err,
            }
        }
        Err(FriendlyError::PartialEdge {
            user: self.id.clone(),
            other: other.clone(),
            source: Box::new(last),
        })
    }
}

impl<'e> User<'e, LogEngine> {
    /// Raw edit history of the `following` log, in append order.
    pub fn following_history(&self) -> Result<History> {
        self.engine.history(&self.id, Direction::Following)
    }

    /// Raw edit history of the `followers` log, in append order.
    pub fn followers_history(&self) -> Result<History> {
        self.engine.history(&self.id, Direction::Followers)
    }
}

impl<E: RelationshipEngine + ?Sized> fmt::Debug for User<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("write_mode", &self.write_mode)
            .finish_non_exhaustive()
    }
}
