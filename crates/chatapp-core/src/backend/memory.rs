//! In-process backend for tests, demos and offline runs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{
    AuthProvider, BackendError, BackendResult, ChatQuery, ChatUpdate, DocumentStore, Subscribers,
    Subscription,
};
use crate::auth::AuthUser;
use crate::forms::MIN_PASSWORD_LEN;
use crate::models::{
    ChatId, ChatRecord, Message, NewChat, UserId, UserPatch, UserProfile, AVATAR_PRESETS,
};

/// Shared, cloneable in-memory document store and auth provider.
///
/// Every write notifies the live watches whose result it changed.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<MemoryState>,
    auth_watchers: Subscribers<(), Option<AuthUser>>,
    user_watchers: Subscribers<UserId, Option<UserProfile>>,
    chat_watchers: Subscribers<ChatQuery, Vec<ChatRecord>>,
}

#[derive(Default)]
struct MemoryState {
    /// Keyed by lowercased email
    accounts: BTreeMap<String, Account>,
    current_user: Option<AuthUser>,
    users: BTreeMap<UserId, UserProfile>,
    chats: BTreeMap<ChatId, ChatRecord>,
    fail_writes: bool,
    write_count: usize,
}

struct Account {
    password: String,
    user: AuthUser,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with three accounts (password `password`) and a
    /// couple of conversations.
    pub fn with_demo_data() -> Self {
        let backend = Self::new();
        let alice = backend.add_account("alice@example.com", "password", "Alice");
        let bob = backend.add_account("bob@example.com", "password", "Bob");
        let carol = backend.add_account("carol@example.com", "password", "Carol");

        for (user, avatar) in [(&bob, AVATAR_PRESETS[1]), (&carol, AVATAR_PRESETS[2])] {
            if let Some(profile) = backend.state().users.get_mut(user) {
                profile.avatar_url = Some(avatar.to_string());
            }
        }

        let mut with_bob = ChatRecord::between(ChatId::generate(), alice.clone(), bob.clone());
        with_bob.messages = vec![
            Message::new("Bob", "Hey Alice! Are we still on for tomorrow?", 1_700_000_000_000),
            Message::new("Alice", "Yes, see you at ten.", 1_700_000_060_000),
            Message::new("Bob", "Great, I'll bring the slides.", 1_700_000_120_000),
        ];
        with_bob.last_message_timestamp = Some(1_700_000_120_000);
        with_bob.last_read_timestamps = BTreeMap::from([
            (alice.clone(), 1_700_000_060_000),
            (bob, 1_700_000_120_000),
        ]);
        backend.insert_chat(with_bob);

        let mut with_carol = ChatRecord::between(ChatId::generate(), carol.clone(), alice.clone());
        with_carol.messages = vec![Message::new("Carol", "Welcome aboard!", 1_699_990_000_000)];
        with_carol.last_message_timestamp = Some(1_699_990_000_000);
        with_carol.last_read_timestamps =
            BTreeMap::from([(carol, 1_699_990_000_000), (alice, 1_699_990_000_000)]);
        backend.insert_chat(with_carol);

        backend
    }

    /// Register an account together with its `users` record
    pub fn add_account(&self, email: &str, password: &str, name: &str) -> UserId {
        let id = UserId::generate();
        let email = email.trim().to_string();
        {
            let mut state = self.state();
            state.accounts.insert(
                email.to_lowercase(),
                Account {
                    password: password.to_string(),
                    user: AuthUser {
                        id: id.clone(),
                        email: Some(email.clone()),
                    },
                },
            );
            let mut profile = UserProfile::new(id.clone(), name);
            profile.email = Some(email);
            state.users.insert(id.clone(), profile);
        }
        self.publish_users();
        id
    }

    /// Store `profile` as-is, replacing any existing record
    pub fn insert_user(&self, profile: UserProfile) {
        self.state().users.insert(profile.id.clone(), profile);
        self.publish_users();
    }

    /// Store `chat` as-is; malformed participant lists are kept
    pub fn insert_chat(&self, chat: ChatRecord) {
        self.state().chats.insert(chat.id.clone(), chat);
        self.publish_chats();
    }

    /// Make every subsequent write fail with [`BackendError::Unavailable`]
    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.state().write_count
    }

    pub fn chat(&self, id: &ChatId) -> Option<ChatRecord> {
        self.state().chats.get(id).cloned()
    }

    pub fn chat_count(&self) -> usize {
        self.state().chats.len()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a write under the lock, honoring injected failures
    fn write<T>(&self, apply: impl FnOnce(&mut MemoryState) -> BackendResult<T>) -> BackendResult<T> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(BackendError::Unavailable("write rejected".to_string()));
        }
        let value = apply(&mut state)?;
        state.write_count += 1;
        Ok(value)
    }

    fn set_current_user(&self, user: Option<AuthUser>) {
        self.state().current_user.clone_from(&user);
        self.inner.auth_watchers.publish(|()| user.clone());
    }

    fn publish_users(&self) {
        let users = self.state().users.clone();
        self.inner
            .user_watchers
            .publish(|id| users.get(id).cloned());
    }

    fn publish_chats(&self) {
        let chats = self.state().chats.clone();
        self.inner
            .chat_watchers
            .publish(|query| query.apply(chats.values()));
    }
}

impl AuthProvider for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        let account = self
            .state()
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|account| account.password == password)
            .map(|account| account.user.clone());
        let user =
            account.ok_or_else(|| BackendError::Auth("invalid login credentials".to_string()))?;

        self.set_current_user(Some(user.clone()));
        tracing::debug!("Signed in {}", user.id);
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        let email = email.trim();
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::Auth(format!(
                "password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = {
            let mut state = self.state();
            let key = email.to_lowercase();
            if state.accounts.contains_key(&key) {
                return Err(BackendError::Auth("email already registered".to_string()));
            }
            let user = AuthUser {
                id: UserId::generate(),
                email: Some(email.to_string()),
            };
            state.accounts.insert(
                key,
                Account {
                    password: password.to_string(),
                    user: user.clone(),
                },
            );
            user
        };

        self.set_current_user(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> BackendResult<()> {
        self.set_current_user(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state().current_user.clone()
    }

    fn watch_auth(&self) -> Subscription<Option<AuthUser>> {
        let current = self.current_user();
        self.inner.auth_watchers.subscribe((), current)
    }
}

impl DocumentStore for MemoryBackend {
    async fn get_user(&self, id: &UserId) -> BackendResult<Option<UserProfile>> {
        Ok(self.state().users.get(id).cloned())
    }

    async fn list_users(&self) -> BackendResult<Vec<UserProfile>> {
        Ok(self.state().users.values().cloned().collect())
    }

    async fn merge_user(&self, id: &UserId, patch: &UserPatch) -> BackendResult<()> {
        self.write(|state| {
            state
                .users
                .entry(id.clone())
                .or_insert_with(|| UserProfile::new(id.clone(), ""))
                .apply(patch);
            Ok(())
        })?;
        self.publish_users();
        Ok(())
    }

    fn watch_user(&self, id: &UserId) -> Subscription<Option<UserProfile>> {
        let current = self.state().users.get(id).cloned();
        self.inner.user_watchers.subscribe(id.clone(), current)
    }

    async fn query_chats(&self, query: &ChatQuery) -> BackendResult<Vec<ChatRecord>> {
        Ok(query.apply(self.state().chats.values()))
    }

    fn watch_chats(&self, query: &ChatQuery) -> Subscription<Vec<ChatRecord>> {
        let current = query.apply(self.state().chats.values());
        self.inner.chat_watchers.subscribe(query.clone(), current)
    }

    async fn create_chat(&self, chat: &NewChat) -> BackendResult<ChatId> {
        let id = self.write(|state| {
            let id = ChatId::generate();
            state
                .chats
                .insert(id.clone(), chat.clone().into_record(id.clone()));
            Ok(id)
        })?;
        self.publish_chats();
        Ok(id)
    }

    async fn update_chat(&self, id: &ChatId, update: &ChatUpdate) -> BackendResult<()> {
        self.write(|state| {
            let chat = state
                .chats
                .get_mut(id)
                .ok_or_else(|| BackendError::NotFound(format!("chat {id}")))?;
            update.apply_to(chat);
            Ok(())
        })?;
        self.publish_chats();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn sign_in_checks_password_case_insensitive_email() {
        let backend = MemoryBackend::new();
        let id = backend.add_account("Alice@Example.com", "secret1", "Alice");

        let user = backend.sign_in("alice@example.com", "secret1").await.unwrap();
        assert_eq!(user.id, id);
        assert!(matches!(
            backend.sign_in("alice@example.com", "nope").await,
            Err(BackendError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn sign_up_rejects_duplicates_and_short_passwords() {
        let backend = MemoryBackend::new();
        backend.sign_up("dan@example.com", "secret1").await.unwrap();

        assert!(backend.sign_up("dan@example.com", "secret1").await.is_err());
        assert!(backend.sign_up("eve@example.com", "123").await.is_err());
    }

    #[tokio::test]
    async fn watch_auth_reports_sign_in_and_out() {
        let backend = MemoryBackend::new();
        backend.add_account("alice@example.com", "secret1", "Alice");
        let mut auth = backend.watch_auth();
        assert_eq!(auth.next().await, Some(None));

        let user = backend.sign_in("alice@example.com", "secret1").await.unwrap();
        assert_eq!(auth.next().await, Some(Some(user)));

        backend.sign_out().await.unwrap();
        assert_eq!(auth.next().await, Some(None));
    }

    #[tokio::test]
    async fn merge_user_keeps_untouched_fields_and_notifies() {
        let backend = MemoryBackend::new();
        let id = backend.add_account("alice@example.com", "secret1", "Alice");
        let mut watch = backend.watch_user(&id);
        watch.latest();

        backend
            .merge_user(
                &id,
                &UserPatch {
                    name: Some("Alicia".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();

        let profile = watch.latest().flatten().unwrap();
        assert_eq!(profile.name, "Alicia");
        assert_eq!(profile.email.as_deref(), Some("alice@example.com"));
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn inserted_user_is_listed_without_an_account() {
        let backend = MemoryBackend::new();
        backend.add_account("alice@example.com", "secret1", "Alice");
        backend.insert_user(UserProfile::new(UserId::new("legacy"), "Legacy"));

        let users = backend.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|user| user.name == "Legacy"));
        assert!(backend.sign_in("legacy", "secret1").await.is_err());
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn chat_watch_sees_new_and_updated_chats() {
        let backend = MemoryBackend::new();
        let me = UserId::new("me");
        let mut watch = backend.watch_chats(&ChatQuery::recent_for(me.clone()));
        assert_eq!(watch.latest(), Some(Vec::new()));

        let id = backend
            .create_chat(&NewChat::between(me.clone(), "you".into()))
            .await
            .unwrap();
        assert_eq!(watch.latest().map(|chats| chats.len()), Some(1));

        backend
            .update_chat(&id, &ChatUpdate::mark_read(&me, 5))
            .await
            .unwrap();
        let chats = watch.latest().unwrap();
        assert_eq!(chats[0].last_read_by(&me), 5);
    }

    #[tokio::test]
    async fn unrelated_write_does_not_notify_chat_watch() {
        let backend = MemoryBackend::new();
        let mut watch = backend.watch_chats(&ChatQuery::recent_for("me".into()));
        watch.latest();

        backend
            .create_chat(&NewChat::between("x".into(), "y".into()))
            .await
            .unwrap();
        assert_eq!(watch.try_next(), None);
    }

    #[tokio::test]
    async fn failed_writes_change_nothing() {
        let backend = MemoryBackend::new();
        backend.set_fail_writes(true);

        let result = backend
            .create_chat(&NewChat::between("a".into(), "b".into()))
            .await;
        assert!(matches!(result, Err(BackendError::Unavailable(_))));
        assert_eq!(backend.chat_count(), 0);
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn update_of_missing_chat_is_not_found() {
        let backend = MemoryBackend::new();
        let result = backend
            .update_chat(&ChatId::new("missing"), &ChatUpdate::default())
            .await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn demo_data_is_consistent() {
        let backend = MemoryBackend::with_demo_data();
        let alice = backend.sign_in("alice@example.com", "password").await.unwrap();

        let chats = backend
            .query_chats(&ChatQuery::recent_for(alice.id.clone()))
            .await
            .unwrap();
        assert_eq!(chats.len(), 2);
        assert!(chats[0].last_message_timestamp > chats[1].last_message_timestamp);
        assert_eq!(backend.list_users().await.unwrap().len(), 3);
    }
}
