//! Identifier and tag types shared by the storage engine and the user API.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, externally supplied user identifier.
///
/// Compared byte-exact; the store never normalises or validates it. Callers
/// are responsible for keeping the configured separator and line breaks out
/// of identifiers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps `id` as-is. The empty string is a valid identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes, as hashed for bucketing.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Unwraps the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&UserId> for UserId {
    fn from(value: &UserId) -> Self {
        value.clone()
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UserId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for UserId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for UserId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Which of a user's two logs a record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Outgoing edges: users this user follows.
    Following,
    /// Incoming edges: users following this user.
    Followers,
}

impl Direction {
    /// Both directions, `following` first.
    pub const ALL: [Direction; 2] = [Direction::Following, Direction::Followers];

    /// File name of the log holding this direction.
    pub fn file_name(self) -> &'static str {
        match self {
            Direction::Following => "following",
            Direction::Followers => "followers",
        }
    }

    /// The direction of the mirror log written by the other side of an edge.
    pub fn inverse(self) -> Self {
        match self {
            Direction::Following => Direction::Followers,
            Direction::Followers => Direction::Following,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Edit recorded in a relationship log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Start following.
    Add,
    /// Stop following.
    Remove,
}

impl Action {
    /// Tag written for [`Action::Add`].
    pub const ADD_TAG: char = 'A';
    /// Tag written for [`Action::Remove`].
    pub const REMOVE_TAG: char = 'D';

    /// Single-character tag encoding this action.
    pub fn tag(self) -> char {
        match self {
            Action::Add => Self::ADD_TAG,
            Action::Remove => Self::REMOVE_TAG,
        }
    }

    /// Decodes a tag; anything but exactly `A` or `D` is rejected.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let mut chars = tag.chars();
        let action = match chars.next()? {
            Self::ADD_TAG => Action::Add,
            Self::REMOVE_TAG => Action::Remove,
            _ => return None,
        };
        chars.next().is_none().then_some(action)
    }
}
