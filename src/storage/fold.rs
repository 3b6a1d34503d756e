//! Reconstruction of a current membership list from a relationship log.

use std::collections::HashSet;

use crate::storage::record::EventRecord;
use crate::types::{Action, UserId};

/// Folds `history` into the currently active identifiers.
///
/// Membership is decided by replaying every record in append order: an add
/// inserts, a remove deletes (removing an absent identifier is a no-op).
/// The survivors are then emitted in the order of their *first* appearance in
/// the history, whatever that first record's action was. Re-adding a user
/// after removing them therefore keeps their original position.
///
/// Runs in O(history) time and O(active set) extra space, and is a pure
/// function of its input.
pub fn project_active_set(history: &[EventRecord]) -> Vec<UserId> {
    let mut active: HashSet<&str> = HashSet::new();
    for record in history {
        match record.action {
            Action::Add => {
                active.insert(record.other.as_str());
            }
            Action::Remove => {
                active.remove(record.other.as_str());
            }
        }
    }

    let mut ordered = Vec::with_capacity(active.len());
    for record in history {
        if active.remove(record.other.as_str()) {
            ordered.push(record.other.clone());
        }
    }
    ordered
}
