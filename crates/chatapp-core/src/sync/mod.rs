//! Shell synchronization: the one-time user fetch and the two live watches
//! (session user record and recent chats) that feed the stores.

use crate::backend::{ChatQuery, DocumentStore, Subscription};
use crate::models::{ChatRecord, UserId, UserProfile};
use crate::store::{AppAction, ChatListAction, SessionAction, FETCH_CHATS_FAILED, FETCH_USER_FAILED};

/// Live watches owned by the mounted shell; dropping them unsubscribes.
#[derive(Debug)]
pub struct ShellSubscriptions {
    user: Subscription<Option<UserProfile>>,
    chats: Subscription<Vec<ChatRecord>>,
}

/// Load the session user's record and the recent chats, then open the live
/// watches for both.
///
/// Fetch failures are logged and recorded in the stores' error fields.
pub async fn start_shell_sync<S: DocumentStore>(
    store: &S,
    user_id: &UserId,
    mut dispatch: impl FnMut(AppAction),
) -> ShellSubscriptions {
    dispatch(SessionAction::SetLoading(true).into());
    match store.get_user(user_id).await {
        Ok(Some(profile)) => dispatch(SessionAction::SetUserData(Some(profile)).into()),
        Ok(None) => tracing::warn!("No user record for {}", user_id),
        Err(error) => {
            tracing::error!("Error fetching user data: {}", error);
            dispatch(SessionAction::SetError(Some(FETCH_USER_FAILED.to_string())).into());
        }
    }
    dispatch(SessionAction::SetLoading(false).into());

    let query = ChatQuery::recent_for(user_id.clone());
    dispatch(ChatListAction::SetLoading(true).into());
    match store.query_chats(&query).await {
        Ok(chats) => dispatch(ChatListAction::SetChats(chats).into()),
        Err(error) => {
            tracing::error!("Error fetching chats: {}", error);
            dispatch(ChatListAction::SetError(Some(FETCH_CHATS_FAILED.to_string())).into());
        }
    }
    dispatch(ChatListAction::SetLoading(false).into());

    tracing::debug!("Shell sync started for {}", user_id);
    ShellSubscriptions {
        user: store.watch_user(user_id),
        chats: store.watch_chats(&query),
    }
}

impl ShellSubscriptions {
    /// Forward snapshots to `dispatch` until both watches close.
    pub async fn run(mut self, mut dispatch: impl FnMut(AppAction)) {
        loop {
            tokio::select! {
                Some(profile) = self.user.next() => forward_user(profile, &mut dispatch),
                Some(chats) = self.chats.next() => {
                    dispatch(ChatListAction::SetChats(chats).into());
                }
                else => break,
            }
        }
    }

    /// Apply the newest queued snapshots without waiting.
    ///
    /// Returns whether anything was dispatched.
    pub fn pump(&mut self, mut dispatch: impl FnMut(AppAction)) -> bool {
        let mut changed = false;
        if let Some(profile) = self.user.latest() {
            forward_user(profile, &mut dispatch);
            changed = true;
        }
        if let Some(chats) = self.chats.latest() {
            dispatch(ChatListAction::SetChats(chats).into());
            changed = true;
        }
        changed
    }

    pub fn cancel(self) {
        self.user.cancel();
        self.chats.cancel();
    }
}

fn forward_user(profile: Option<UserProfile>, dispatch: &mut impl FnMut(AppAction)) {
    match profile {
        Some(profile) => dispatch(SessionAction::SetUserData(Some(profile)).into()),
        None => tracing::warn!("Session user record disappeared"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::{ChatUpdate, MemoryBackend};
    use crate::models::{ChatId, Message, UserPatch};
    use crate::store::AppStore;

    async fn signed_in_shell() -> (MemoryBackend, UserId, AppStore, ShellSubscriptions) {
        let backend = MemoryBackend::new();
        let me = backend.add_account("me@example.com", "secret1", "Me");
        let bob = backend.add_account("bob@example.com", "secret1", "Bob");
        backend.insert_chat(ChatRecord::between(ChatId::new("c1"), me.clone(), bob));

        let mut store = AppStore::default();
        let shell = start_shell_sync(&backend, &me, |action| store.dispatch(action)).await;
        (backend, me, store, shell)
    }

    #[tokio::test]
    async fn start_loads_user_and_chats() {
        let (_, _, store, _shell) = signed_in_shell().await;

        assert_eq!(store.session.display_name(), Some("Me"));
        assert!(!store.session.loading);
        assert_eq!(store.chats.chats.len(), 1);
        assert!(!store.chats.loading);
        assert_eq!(store.chats.error, None);
    }

    #[tokio::test]
    async fn sent_message_flows_back_through_chat_watch() {
        let (backend, me, mut store, mut shell) = signed_in_shell().await;
        shell.pump(|action| store.dispatch(action));

        let message = Message::new("Bob", "ping", 42);
        backend
            .update_chat(&ChatId::new("c1"), &ChatUpdate::message_sent(&me, message.clone()))
            .await
            .unwrap();

        assert!(shell.pump(|action| store.dispatch(action)));
        let chat = store.chats.find(&ChatId::new("c1")).unwrap();
        assert_eq!(chat.messages, vec![message]);
    }

    #[tokio::test]
    async fn profile_change_reaches_session_store() {
        let (backend, me, mut store, mut shell) = signed_in_shell().await;
        shell.pump(|action| store.dispatch(action));

        let patch = UserPatch {
            name: Some("Meg".to_string()),
            ..UserPatch::default()
        };
        backend.merge_user(&me, &patch).await.unwrap();

        shell.pump(|action| store.dispatch(action));
        assert_eq!(store.session.display_name(), Some("Meg"));
    }

    #[tokio::test]
    async fn run_forwards_initial_snapshots_then_waits() {
        let (_backend, _, mut store, shell) = signed_in_shell().await;
        let mut dispatched = 0;

        let outcome = tokio::time::timeout(std::time::Duration::from_millis(50), async {
            shell.run(|action| {
                dispatched += 1;
                store.dispatch(action);
            })
            .await;
        })
        .await;

        // The watches stay open while the backend lives.
        assert!(outcome.is_err());
        assert_eq!(dispatched, 2);
    }

    #[tokio::test]
    async fn cancel_unregisters_watches() {
        let (backend, me, _, shell) = signed_in_shell().await;
        shell.cancel();

        // A write after cancel must not panic or block.
        backend
            .update_chat(&ChatId::new("c1"), &ChatUpdate::mark_read(&me, 1))
            .await
            .unwrap();
    }
}
