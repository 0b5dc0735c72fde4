//! Presentation state derived from fetched records.
//!
//! Everything here is a pure function of the chat records, the viewer and
//! the profile cache, so list views can recompute on every push.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::models::{ChatId, ChatRecord, UserId, UserProfile};
use crate::util::truncate_text;

pub const PREVIEW_MAX_CHARS: usize = 50;
pub const NO_MESSAGES_PLACEHOLDER: &str = "No messages yet.";
/// Name shown while the other participant's profile is being fetched
pub const LOADING_NAME: &str = "Loading...";
pub const DEFAULT_LIST_AVATAR: &str = "/images/default-avatar.png";

/// Why a chat record cannot be shown in the list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatShapeError {
    #[error("participant list is missing")]
    MissingUsers,
    #[error("expected 2 participants, found {0}")]
    WrongParticipantCount(usize),
    #[error("viewer is not a participant")]
    ViewerNotParticipant,
    #[error("no participant other than the viewer")]
    NoOtherParticipant,
}

/// The participant of a one-to-one chat who is not `viewer`
pub fn other_participant<'a>(
    chat: &'a ChatRecord,
    viewer: &UserId,
) -> Result<&'a UserId, ChatShapeError> {
    let users = chat.users.as_ref().ok_or(ChatShapeError::MissingUsers)?;
    if users.len() != 2 {
        return Err(ChatShapeError::WrongParticipantCount(users.len()));
    }
    if !users.contains(viewer) {
        return Err(ChatShapeError::ViewerNotParticipant);
    }
    users
        .iter()
        .find(|user| *user != viewer)
        .ok_or(ChatShapeError::NoOtherParticipant)
}

/// Whether `chat` has news for the viewer.
///
/// True when the last message is newer than the viewer's last-read time and
/// was not sent under the viewer's display name. Authorship is compared by
/// name because messages carry only the sender's name.
pub fn is_unread(chat: &ChatRecord, viewer: &UserId, viewer_name: Option<&str>) -> bool {
    let Some(last) = chat.last_message() else {
        return false;
    };
    let authored_by_viewer = viewer_name.is_some_and(|name| last.is_from(name));

    last.timestamp > chat.last_read_by(viewer) && !authored_by_viewer
}

/// Last message text cut to [`PREVIEW_MAX_CHARS`], or the empty-chat placeholder
pub fn message_preview(chat: &ChatRecord) -> String {
    chat.last_message().map_or_else(
        || NO_MESSAGES_PLACEHOLDER.to_string(),
        |message| truncate_text(&message.text, PREVIEW_MAX_CHARS),
    )
}

/// One rendered row of the chat list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatListEntry {
    pub chat_id: ChatId,
    pub other_user: UserId,
    /// Whether the other participant's profile has been fetched
    pub resolved: bool,
    pub name: String,
    pub avatar_url: String,
    pub preview: String,
    pub last_message_timestamp: Option<i64>,
    pub unread: bool,
}

/// Other-participant profiles, fetched once per id for the life of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileCache {
    profiles: HashMap<UserId, UserProfile>,
    requested: HashSet<UserId>,
}

impl ProfileCache {
    pub fn get(&self, id: &UserId) -> Option<&UserProfile> {
        self.profiles.get(id)
    }

    pub fn insert(&mut self, profile: UserProfile) {
        self.requested.insert(profile.id.clone());
        self.profiles.insert(profile.id.clone(), profile);
    }

    /// Other participants of `chats` that were never requested.
    ///
    /// The returned ids are marked as requested, so each id is handed out
    /// once even if its fetch fails.
    pub fn take_pending(&mut self, chats: &[ChatRecord], viewer: &UserId) -> Vec<UserId> {
        let mut pending = Vec::new();
        for chat in chats {
            if let Ok(other) = other_participant(chat, viewer) {
                if self.requested.insert(other.clone()) {
                    pending.push(other.clone());
                }
            }
        }
        pending
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Build the chat-list rows for `viewer`.
///
/// Malformed records are logged and skipped. A non-blank `filter` keeps
/// chats whose other participant's name contains it (case-insensitive),
/// which drops chats whose profile has not resolved yet.
pub fn derive_chat_list(
    chats: &[ChatRecord],
    viewer: &UserId,
    viewer_name: Option<&str>,
    cache: &ProfileCache,
    filter: &str,
) -> Vec<ChatListEntry> {
    let needle = filter.to_lowercase();
    let filtering = !filter.trim().is_empty();

    chats
        .iter()
        .filter_map(|chat| {
            let other = match other_participant(chat, viewer) {
                Ok(other) => other,
                Err(error) => {
                    tracing::warn!("Chat {} has an incorrect users structure: {}", chat.id, error);
                    return None;
                }
            };
            let profile = cache.get(other);

            if filtering {
                let matches = profile
                    .is_some_and(|profile| profile.name.to_lowercase().contains(&needle));
                if !matches {
                    return None;
                }
            }

            Some(ChatListEntry {
                chat_id: chat.id.clone(),
                other_user: other.clone(),
                resolved: profile.is_some(),
                name: profile.map_or_else(|| LOADING_NAME.to_string(), |p| p.name.clone()),
                avatar_url: profile
                    .and_then(|p| p.avatar_url.clone())
                    .unwrap_or_else(|| DEFAULT_LIST_AVATAR.to_string()),
                preview: message_preview(chat),
                last_message_timestamp: chat.last_message_timestamp,
                unread: is_unread(chat, viewer, viewer_name),
            })
        })
        .collect()
}

/// Directory listing for the user-search panel: everyone but `viewer`,
/// narrowed by a case-insensitive name match when `query` is not blank.
pub fn filter_users<'a>(
    users: &'a [UserProfile],
    viewer: &UserId,
    query: &str,
) -> Vec<&'a UserProfile> {
    let needle = query.to_lowercase();
    let filtering = !query.trim().is_empty();
    users
        .iter()
        .filter(|user| &user.id != viewer)
        .filter(|user| !filtering || user.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::Message;

    fn me() -> UserId {
        UserId::new("me")
    }

    fn chat_with(other: &str, messages: Vec<Message>) -> ChatRecord {
        let mut chat = ChatRecord::between(ChatId::new(format!("c-{other}")), me(), other.into());
        chat.last_message_timestamp = messages.last().map(|m| m.timestamp);
        chat.messages = messages;
        chat
    }

    fn profile(id: &str, name: &str) -> UserProfile {
        UserProfile::new(UserId::new(id), name)
    }

    #[test]
    fn unread_when_newer_message_from_someone_else() {
        let mut chat = chat_with("bob", vec![Message::new("Bob", "hi", 100)]);
        chat.last_read_timestamps.insert(me(), 50);
        assert!(is_unread(&chat, &me(), Some("Me")));
    }

    #[test]
    fn not_unread_once_read() {
        let mut chat = chat_with("bob", vec![Message::new("Bob", "hi", 100)]);
        chat.last_read_timestamps.insert(me(), 100);
        assert!(!is_unread(&chat, &me(), Some("Me")));
    }

    #[test]
    fn unread_follows_newest_message_time_not_chat_field() {
        let mut chat = chat_with("bob", vec![Message::new("Bob", "hi", 100)]);
        chat.last_read_timestamps.insert(me(), 150);
        chat.last_message_timestamp = Some(200);
        assert!(!is_unread(&chat, &me(), Some("Me")));

        chat.last_message_timestamp = Some(10);
        chat.last_read_timestamps.insert(me(), 50);
        assert!(is_unread(&chat, &me(), Some("Me")));
    }

    #[test]
    fn own_message_is_never_unread() {
        let chat = chat_with("bob", vec![Message::new("Me", "hello", 100)]);
        assert!(!is_unread(&chat, &me(), Some("Me")));
    }

    #[test]
    fn chat_without_messages_is_read_and_has_placeholder() {
        let chat = chat_with("bob", Vec::new());
        assert!(!is_unread(&chat, &me(), Some("Me")));
        assert_eq!(message_preview(&chat), NO_MESSAGES_PLACEHOLDER);
    }

    #[test]
    fn preview_truncates_long_text() {
        let text = "x".repeat(80);
        let chat = chat_with("bob", vec![Message::new("Bob", text, 1)]);
        let preview = message_preview(&chat);
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn other_participant_rejects_malformed_records() {
        let mut chat = chat_with("bob", Vec::new());
        assert_eq!(other_participant(&chat, &me()), Ok(&UserId::new("bob")));

        chat.users = None;
        assert_eq!(other_participant(&chat, &me()), Err(ChatShapeError::MissingUsers));

        chat.users = Some(vec![me(), "bob".into(), "carol".into()]);
        assert_eq!(
            other_participant(&chat, &me()),
            Err(ChatShapeError::WrongParticipantCount(3))
        );

        chat.users = Some(vec!["x".into(), "y".into()]);
        assert_eq!(
            other_participant(&chat, &me()),
            Err(ChatShapeError::ViewerNotParticipant)
        );
    }

    #[test]
    fn malformed_chats_are_skipped() {
        let mut broken = chat_with("ghost", Vec::new());
        broken.users = Some(vec![me()]);
        let chats = vec![chat_with("bob", Vec::new()), broken];

        let entries = derive_chat_list(&chats, &me(), Some("Me"), &ProfileCache::default(), "");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].other_user, UserId::new("bob"));
    }

    #[test]
    fn unresolved_profiles_show_loading_but_are_filtered_out() {
        let chats = vec![chat_with("bob", Vec::new()), chat_with("carol", Vec::new())];
        let mut cache = ProfileCache::default();
        cache.insert(profile("carol", "Carol"));

        let all = derive_chat_list(&chats, &me(), None, &cache, "");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, LOADING_NAME);
        assert!(!all[0].resolved);
        assert_eq!(all[0].avatar_url, DEFAULT_LIST_AVATAR);

        let filtered = derive_chat_list(&chats, &me(), None, &cache, "CAR");
        let names: Vec<&str> = filtered.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["Carol"]);

        assert!(derive_chat_list(&chats, &me(), None, &cache, "bob").is_empty());
        assert_eq!(derive_chat_list(&chats, &me(), None, &cache, "   ").len(), 2);
    }

    #[test]
    fn filter_matches_untrimmed_text_only() {
        let chats = vec![chat_with("bob", Vec::new()), chat_with("carol", Vec::new())];
        let mut cache = ProfileCache::default();
        cache.insert(profile("bob", "Bob"));
        cache.insert(profile("carol", "Carol Ann"));

        assert!(derive_chat_list(&chats, &me(), None, &cache, "bob ").is_empty());

        let filter = "ol a";
        let filtered = derive_chat_list(&chats, &me(), None, &cache, filter);
        assert_eq!(filtered.len(), 1);
        for entry in &filtered {
            assert!(entry.name.to_lowercase().contains(&filter.to_lowercase()));
        }

        let users = vec![profile("b", "Bob")];
        assert!(filter_users(&users, &me(), " bob").is_empty());
        assert_eq!(filter_users(&users, &me(), "  ").len(), 1);
    }

    #[test]
    fn take_pending_hands_out_each_participant_once() {
        let chats = vec![chat_with("bob", Vec::new()), chat_with("carol", Vec::new())];
        let mut cache = ProfileCache::default();
        cache.insert(profile("carol", "Carol"));

        assert_eq!(cache.take_pending(&chats, &me()), vec![UserId::new("bob")]);
        assert!(cache.take_pending(&chats, &me()).is_empty());
    }

    #[test]
    fn filter_users_excludes_viewer_and_matches_names() {
        let users = vec![profile("me", "Mel"), profile("a", "Alice"), profile("b", "Bob")];

        let all: Vec<&str> = filter_users(&users, &me(), "")
            .iter()
            .map(|user| user.name.as_str())
            .collect();
        assert_eq!(all, vec!["Alice", "Bob"]);

        let matched: Vec<&str> = filter_users(&users, &me(), "li")
            .iter()
            .map(|user| user.name.as_str())
            .collect();
        assert_eq!(matched, vec!["Alice"]);
    }
}
