use std::cmp::Ordering;
use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::storage::engine::{Member, RelationshipEngine};
use crate::storage::record::unix_timestamp;
use crate::types::{Action, Direction, UserId};

#[derive(Clone, Copy, Debug)]
struct Scored {
    followed_on: f64,
    seq: u64,
}

#[derive(Default)]
struct Sets {
    lists: HashMap<(UserId, Direction), HashMap<UserId, Scored>>,
    next_seq: u64,
}

/// In-process engine that keeps only the latest state of every edge,
/// scored by the time it was added.
///
/// Mirrors a key/value store with time-scored sets: no history is retained,
/// a re-add moves the member to the front, and members are listed most
/// recent first.
#[derive(Default)]
pub struct MemoryEngine {
    sets: RwLock<Sets>,
}

impl MemoryEngine {
    /// Empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lists held. A list is dropped with its last member.
    pub fn list_count(&self) -> usize {
        self.sets.read().lists.len()
    }
}

impl RelationshipEngine for MemoryEngine {
    fn append(
        &self,
        user: &UserId,
        direction: Direction,
        action: Action,
        other: &UserId,
    ) -> Result<()> {
        let mut sets = self.sets.write();
        let key = (user.clone(), direction);
        match action {
            Action::Add => {
                let seq = sets.next_seq;
                sets.next_seq += 1;
                sets.lists.entry(key).or_default().insert(
                    other.clone(),
                    Scored {
                        followed_on: unix_timestamp(),
                        seq,
                    },
                );
            }
            Action::Remove => {
                // Lists only exist while they hold a member.
                let emptied = match sets.lists.get_mut(&key) {
                    Some(list) => {
                        list.remove(other);
                        list.is_empty()
                    }
                    None => false,
                };
                if emptied {
                    sets.lists.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn members(&self, user: &UserId, direction: Direction) -> Result<Vec<Member>> {
        let sets = self.sets.read();
        let Some(list) = sets.lists.get(&(user.clone(), direction)) else {
            return Ok(Vec::new());
        };
        let mut scored: Vec<(&UserId, Scored)> =
            list.iter().map(|(id, score)| (id, *score)).collect();
        scored.sort_by(|a, b| {
            b.1.followed_on
                .partial_cmp(&a.1.followed_on)
                .unwrap_or(Ordering::Equal)
                .then(b.1.seq.cmp(&a.1.seq))
        });
        Ok(scored
            .into_iter()
            .map(|(id, score)| Member {
                user: id.clone(),
                followed_on: Some(score.followed_on),
            })
            .collect())
    }

    fn contains(&self, user: &UserId, direction: Direction, other: &str) -> Result<bool> {
        let sets = self.sets.read();
        Ok(sets
            .lists
            .get(&(user.clone(), direction))
            .is_some_and(|list| list.contains_key(other)))
    }

    fn purge(&self, user: &UserId) -> Result<()> {
        let mut sets = self.sets.write();
        for direction in Direction::ALL {
            sets.lists.remove(&(user.clone(), direction));
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut sets = self.sets.write();
        sets.lists.clear();
        Ok(())
    }
}
