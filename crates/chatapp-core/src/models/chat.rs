//! Chat and message models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::UserId;

/// Identifier of a record in the `chats` collection
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (UUID v7, time-sortable)
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A chat message. The timestamp comes from the sender's clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender display name
    pub name: String,
    pub text: String,
    /// Send time (Unix ms, client clock)
    pub timestamp: i64,
}

impl Message {
    pub fn new(name: impl Into<String>, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            timestamp,
        }
    }

    /// Whether the message was sent under `display_name`
    pub fn is_from(&self, display_name: &str) -> bool {
        self.name == display_name
    }
}

/// A record in the `chats` collection as the backend returns it.
///
/// `users` is kept as delivered: a record may lack it or hold the wrong
/// number of participants, and views skip such records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: ChatId,
    /// Participant pair, fixed at creation
    #[serde(default)]
    pub users: Option<Vec<UserId>>,
    /// Append-only message sequence in insertion order
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Per-participant last-read time (Unix ms, client clock)
    #[serde(default)]
    pub last_read_timestamps: BTreeMap<UserId, i64>,
    /// Time of the newest message (Unix ms); `None` until the first message
    #[serde(default)]
    pub last_message_timestamp: Option<i64>,
}

impl ChatRecord {
    /// Create an empty chat between two users
    pub fn between(id: ChatId, first: UserId, second: UserId) -> Self {
        Self {
            id,
            users: Some(vec![first, second]),
            messages: Vec::new(),
            last_read_timestamps: BTreeMap::new(),
            last_message_timestamp: None,
        }
    }

    /// Whether `user` appears in the participant list
    pub fn includes(&self, user: &UserId) -> bool {
        self.users
            .as_ref()
            .is_some_and(|users| users.contains(user))
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Last-read time of `user`, 0 when never recorded
    pub fn last_read_by(&self, user: &UserId) -> i64 {
        self.last_read_timestamps.get(user).copied().unwrap_or(0)
    }
}

/// Payload for creating a chat record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChat {
    pub users: Vec<UserId>,
    pub last_message_timestamp: Option<i64>,
}

impl NewChat {
    /// A new one-to-one chat with no messages yet
    pub fn between(initiator: UserId, target: UserId) -> Self {
        Self {
            users: vec![initiator, target],
            last_message_timestamp: None,
        }
    }

    /// Materialize the record the backend stores for this payload
    pub fn into_record(self, id: ChatId) -> ChatRecord {
        ChatRecord {
            id,
            users: Some(self.users),
            messages: Vec::new(),
            last_read_timestamps: BTreeMap::new(),
            last_message_timestamp: self.last_message_timestamp,
        }
    }
}
