//! Backend collaborators: the document store and the auth provider.
//!
//! The application never talks to a concrete service directly. Views and
//! operations are generic over [`DocumentStore`] and [`AuthProvider`]; the
//! crate ships an in-process [`MemoryBackend`] and a remote
//! [`SupabaseBackend`].

mod memory;
mod subscription;
mod supabase;

use thiserror::Error;

use crate::auth::AuthUser;
use crate::models::{ChatId, ChatRecord, Message, NewChat, UserId, UserPatch, UserProfile};

pub use memory::MemoryBackend;
pub(crate) use subscription::Subscribers;
pub use subscription::Subscription;
pub use supabase::SupabaseBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid backend configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Backend API error: {0}")]
    Api(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Email/password authentication with a current-user change stream.
#[allow(async_fn_in_trait)]
pub trait AuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthUser>;

    /// Create an account and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser>;

    async fn sign_out(&self) -> BackendResult<()>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Watch the signed-in user; the first snapshot is the current state
    fn watch_auth(&self) -> Subscription<Option<AuthUser>>;
}

/// The `users` and `chats` collections.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn get_user(&self, id: &UserId) -> BackendResult<Option<UserProfile>>;

    /// Every record in `users`
    async fn list_users(&self) -> BackendResult<Vec<UserProfile>>;

    /// Upsert with merge: fields absent from `patch` are left untouched
    async fn merge_user(&self, id: &UserId, patch: &UserPatch) -> BackendResult<()>;

    fn watch_user(&self, id: &UserId) -> Subscription<Option<UserProfile>>;

    async fn query_chats(&self, query: &ChatQuery) -> BackendResult<Vec<ChatRecord>>;

    fn watch_chats(&self, query: &ChatQuery) -> Subscription<Vec<ChatRecord>>;

    async fn create_chat(&self, chat: &NewChat) -> BackendResult<ChatId>;

    /// Apply every field of `update` as one atomic write
    async fn update_chat(&self, id: &ChatId, update: &ChatUpdate) -> BackendResult<()>;
}

/// Everything the application needs from its backend.
pub trait Backend: AuthProvider + DocumentStore + Clone + 'static {}

impl<T> Backend for T where T: AuthProvider + DocumentStore + Clone + 'static {}

/// Query over `chats`: participant containment, optional newest-first order
/// by `last_message_timestamp` (chats without messages last), optional limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatQuery {
    pub participant: UserId,
    pub newest_first: bool,
    pub limit: Option<usize>,
}

impl ChatQuery {
    /// Size of the live chat list
    pub const RECENT_LIMIT: usize = 10;

    /// The live chat-list query: newest first, capped at [`Self::RECENT_LIMIT`]
    pub fn recent_for(participant: UserId) -> Self {
        Self {
            participant,
            newest_first: true,
            limit: Some(Self::RECENT_LIMIT),
        }
    }

    /// Every chat `participant` belongs to, unordered and unlimited
    pub const fn all_for(participant: UserId) -> Self {
        Self {
            participant,
            newest_first: false,
            limit: None,
        }
    }

    /// Evaluate the query over a set of records
    pub fn apply<'a>(&self, chats: impl IntoIterator<Item = &'a ChatRecord>) -> Vec<ChatRecord> {
        let mut matched: Vec<ChatRecord> = chats
            .into_iter()
            .filter(|chat| chat.includes(&self.participant))
            .cloned()
            .collect();

        if self.newest_first {
            // None sorts below Some, so chats without messages end up last.
            matched.sort_by(|a, b| b.last_message_timestamp.cmp(&a.last_message_timestamp));
        }
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

/// Field-level update of one chat record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatUpdate {
    /// Appended with array-union semantics
    pub append_message: Option<Message>,
    pub last_message_timestamp: Option<i64>,
    /// `last_read_timestamps[user] = time`
    pub last_read: Option<(UserId, i64)>,
}

impl ChatUpdate {
    /// Append `message`, bump the chat's last-message time, and mark the
    /// sender as having read up to the same time.
    pub fn message_sent(sender: &UserId, message: Message) -> Self {
        let sent_at = message.timestamp;
        Self {
            append_message: Some(message),
            last_message_timestamp: Some(sent_at),
            last_read: Some((sender.clone(), sent_at)),
        }
    }

    pub fn mark_read(reader: &UserId, read_at: i64) -> Self {
        Self {
            last_read: Some((reader.clone(), read_at)),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, chat: &mut ChatRecord) {
        if let Some(message) = &self.append_message {
            if !chat.messages.contains(message) {
                chat.messages.push(message.clone());
            }
        }
        if let Some(timestamp) = self.last_message_timestamp {
            chat.last_message_timestamp = Some(timestamp);
        }
        if let Some((reader, read_at)) = &self.last_read {
            chat.last_read_timestamps.insert(reader.clone(), *read_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn chat(id: &str, users: &[&str], last_message_timestamp: Option<i64>) -> ChatRecord {
        ChatRecord {
            last_message_timestamp,
            users: Some(users.iter().map(|user| UserId::from(*user)).collect()),
            ..ChatRecord::between(ChatId::from(id), "x".into(), "y".into())
        }
    }

    #[test]
    fn recent_query_filters_sorts_and_limits() {
        let chats = vec![
            chat("old", &["me", "a"], Some(10)),
            chat("empty", &["me", "b"], None),
            chat("new", &["me", "c"], Some(30)),
            chat("foreign", &["x", "y"], Some(50)),
        ];

        let result = ChatQuery::recent_for("me".into()).apply(&chats);
        let ids: Vec<&str> = result.iter().map(|chat| chat.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "empty"]);
    }

    #[test]
    fn recent_query_caps_at_ten() {
        let chats: Vec<ChatRecord> = (0..15)
            .map(|n| chat(&format!("c{n}"), &["me", "other"], Some(n)))
            .collect();

        let result = ChatQuery::recent_for("me".into()).apply(&chats);
        assert_eq!(result.len(), ChatQuery::RECENT_LIMIT);
        assert_eq!(result[0].last_message_timestamp, Some(14));
    }

    #[test]
    fn all_query_is_unlimited() {
        let chats: Vec<ChatRecord> = (0..15)
            .map(|n| chat(&format!("c{n}"), &["me", "other"], None))
            .collect();
        assert_eq!(ChatQuery::all_for("me".into()).apply(&chats).len(), 15);
    }

    #[test]
    fn message_sent_updates_three_fields_with_one_time() {
        let mut record = chat("c", &["me", "you"], None);
        let message = Message::new("Me", "hello", 1_000);

        ChatUpdate::message_sent(&"me".into(), message.clone()).apply_to(&mut record);

        assert_eq!(record.messages, vec![message]);
        assert_eq!(record.last_message_timestamp, Some(1_000));
        assert_eq!(record.last_read_by(&"me".into()), 1_000);
        assert_eq!(record.last_read_by(&"you".into()), 0);
    }

    #[test]
    fn append_has_array_union_semantics() {
        let mut record = chat("c", &["me", "you"], None);
        let update = ChatUpdate::message_sent(&"me".into(), Message::new("Me", "hi", 5));
        update.apply_to(&mut record);
        update.apply_to(&mut record);
        assert_eq!(record.messages.len(), 1);
    }

    #[test]
    fn mark_read_touches_only_read_map() {
        let mut record = chat("c", &["me", "you"], Some(3));
        ChatUpdate::mark_read(&"you".into(), 9).apply_to(&mut record);
        assert_eq!(record.last_read_by(&"you".into()), 9);
        assert_eq!(record.last_message_timestamp, Some(3));
        assert!(record.messages.is_empty());
    }
}
