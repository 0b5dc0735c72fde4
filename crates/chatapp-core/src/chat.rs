//! Chat operations: sending, read markers, and one-to-one chat resolution.

use crate::backend::{ChatQuery, ChatUpdate, DocumentStore};
use crate::derive::ProfileCache;
use crate::models::{ChatId, ChatRecord, Message, NewChat, UserId, UserProfile};
use crate::store::ChatListState;
use crate::util::now_millis;
use crate::{Error, Result};

/// Inline error shown under the composer when a send fails
pub const SEND_FAILED_NOTICE: &str = "Failed to send message. Please try again.";
/// Placeholder for the message pane when no chat is open
pub const SELECT_CHAT_NOTICE: &str = "Select a chat";

/// Append a message from `sender` to `chat_id`.
///
/// Blank text fails with [`Error::EmptyMessage`] before any backend call.
/// The append, the chat's last-message time and the sender's read marker
/// are written as one update stamped with a single client time.
pub async fn send_message<S: DocumentStore>(
    store: &S,
    chat_id: &ChatId,
    sender: &UserProfile,
    text: &str,
) -> Result<Message> {
    if text.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    let message = Message::new(sender.name.clone(), text, now_millis());
    let update = ChatUpdate::message_sent(&sender.id, message.clone());

    store.update_chat(chat_id, &update).await.map_err(|error| {
        tracing::error!("Error sending message to chat {}: {}", chat_id, error);
        Error::from(error)
    })?;

    Ok(message)
}

/// Record that `reader` has seen `chat_id` up to now
pub async fn mark_chat_read<S: DocumentStore>(
    store: &S,
    chat_id: &ChatId,
    reader: &UserId,
) -> Result<()> {
    store
        .update_chat(chat_id, &ChatUpdate::mark_read(reader, now_millis()))
        .await
        .map_err(|error| {
            tracing::error!("Error updating last read timestamp for {}: {}", chat_id, error);
            Error::from(error)
        })
}

/// The chat the message pane shows for the routed id.
///
/// `None` when no id is routed or the id is not among the listed chats;
/// the pane then shows [`SELECT_CHAT_NOTICE`].
pub fn routed_chat<'a>(
    listed: &'a ChatListState,
    routed: Option<&ChatId>,
) -> Option<&'a ChatRecord> {
    routed.and_then(|id| listed.find(id))
}

/// Mark `chat_id` read for `viewer` and hand back the chat to open.
///
/// The caller navigates only on `Ok`; a failed write keeps the view where
/// it is.
pub async fn open_listed_chat<S: DocumentStore>(
    store: &S,
    chat_id: &ChatId,
    viewer: &UserId,
) -> Result<ChatId> {
    mark_chat_read(store, chat_id, viewer).await?;
    Ok(chat_id.clone())
}

/// Outcome of selecting a user in the search panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectChat {
    Existing(ChatId),
    Created(ChatId),
}

impl DirectChat {
    pub const fn id(&self) -> &ChatId {
        match self {
            Self::Existing(id) | Self::Created(id) => id,
        }
    }
}

/// Find the chat between `viewer` and `target`, creating it when absent.
///
/// This is a read followed by a write with no uniqueness guarantee; two
/// users selecting each other at the same moment can both create a chat.
pub async fn open_direct_chat<S: DocumentStore>(
    store: &S,
    viewer: &UserId,
    target: &UserId,
) -> Result<DirectChat> {
    let chats = store.query_chats(&ChatQuery::all_for(viewer.clone())).await?;
    if let Some(existing) = chats.iter().find(|chat| chat.includes(target)) {
        tracing::debug!("Opening existing chat {}", existing.id);
        return Ok(DirectChat::Existing(existing.id.clone()));
    }

    let id = store
        .create_chat(&NewChat::between(viewer.clone(), target.clone()))
        .await?;
    tracing::info!("Created chat {} with {}", id, target);
    Ok(DirectChat::Created(id))
}

/// Fetch the profiles of `ids`, skipping missing records and failures.
pub async fn fetch_profiles<S: DocumentStore>(store: &S, ids: &[UserId]) -> Vec<UserProfile> {
    let mut profiles = Vec::with_capacity(ids.len());
    for id in ids {
        match store.get_user(id).await {
            Ok(Some(profile)) => profiles.push(profile),
            Ok(None) => tracing::warn!("User {} not found", id),
            Err(error) => tracing::error!("Error fetching user {}: {}", id, error),
        }
    }
    profiles
}

/// Fetch any participants of `chats` the cache has not seen yet
pub async fn refresh_profile_cache<S: DocumentStore>(
    store: &S,
    cache: &mut ProfileCache,
    chats: &[ChatRecord],
    viewer: &UserId,
) {
    let pending = cache.take_pending(chats, viewer);
    if pending.is_empty() {
        return;
    }
    for profile in fetch_profiles(store, &pending).await {
        cache.insert(profile);
    }
}

/// Compose-field state of the message pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    pub text: String,
    pub error: Option<String>,
}

impl Composer {
    pub fn can_send(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Apply the outcome of a send: clear on success, keep the draft and
    /// show [`SEND_FAILED_NOTICE`] on failure.
    pub fn finish(&mut self, outcome: &Result<Message>) {
        match outcome {
            Ok(_) => {
                self.text.clear();
                self.error = None;
            }
            Err(Error::EmptyMessage) => {}
            Err(_) => self.error = Some(SEND_FAILED_NOTICE.to_string()),
        }
    }
}
