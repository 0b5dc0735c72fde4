//! Reducer-style application stores.
//!
//! Each store owns a slice of state and changes only through its tagged
//! actions. UI layers hold an [`AppStore`] and feed it [`AppAction`]s from
//! backend subscriptions and user input.

mod chats;
mod session;
mod theme;

pub use chats::{ChatListAction, ChatListState, FETCH_CHATS_FAILED};
pub use session::{SessionAction, SessionState, FETCH_USER_FAILED};
pub use theme::{ThemeAction, ThemeState};

/// A state slice updated by tagged actions
pub trait Reducer {
    type Action;

    fn reduce(&mut self, action: Self::Action);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Theme(ThemeAction),
    Session(SessionAction),
    Chats(ChatListAction),
}

impl From<ThemeAction> for AppAction {
    fn from(action: ThemeAction) -> Self {
        Self::Theme(action)
    }
}

impl From<SessionAction> for AppAction {
    fn from(action: SessionAction) -> Self {
        Self::Session(action)
    }
}

impl From<ChatListAction> for AppAction {
    fn from(action: ChatListAction) -> Self {
        Self::Chats(action)
    }
}

/// The three stores together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppStore {
    pub theme: ThemeState,
    pub session: SessionState,
    pub chats: ChatListState,
}

impl AppStore {
    pub fn dispatch(&mut self, action: impl Into<AppAction>) {
        self.reduce(action.into());
    }

    /// The shell shows its spinner until both the user and the chats load
    pub const fn shell_loading(&self) -> bool {
        self.session.loading || self.chats.loading
    }

    /// Clear per-user state on sign-out; the theme survives
    pub fn reset_session(&mut self) {
        self.session = SessionState::default();
        self.chats = ChatListState::default();
    }
}

impl Reducer for AppStore {
    type Action = AppAction;

    fn reduce(&mut self, action: AppAction) {
        match action {
            AppAction::Theme(action) => self.theme.reduce(action),
            AppAction::Session(action) => self.session.reduce(action),
            AppAction::Chats(action) => self.chats.reduce(action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Theme, UserProfile};

    #[test]
    fn dispatch_routes_actions_to_their_store() {
        let mut store = AppStore::default();
        store.dispatch(ThemeAction::Toggle);
        store.dispatch(SessionAction::SetLoading(false));
        store.dispatch(ChatListAction::SetError(Some(FETCH_CHATS_FAILED.to_string())));

        assert_eq!(store.theme.theme, Theme::Dark);
        assert!(!store.session.loading);
        assert_eq!(store.chats.error.as_deref(), Some(FETCH_CHATS_FAILED));
    }

    #[test]
    fn shell_loads_until_both_stores_finish() {
        let mut store = AppStore::default();
        assert!(store.shell_loading());

        store.dispatch(SessionAction::SetLoading(false));
        assert!(store.shell_loading());

        store.dispatch(ChatListAction::SetLoading(false));
        assert!(!store.shell_loading());

        store.reset_session();
        assert!(store.shell_loading());
    }

    #[test]
    fn reset_session_keeps_theme() {
        let mut store = AppStore::default();
        store.dispatch(ThemeAction::Set(Theme::Dark));
        store.dispatch(SessionAction::SetUserData(Some(UserProfile::new(
            "me".into(),
            "Me",
        ))));

        store.reset_session();
        assert_eq!(store.theme.theme, Theme::Dark);
        assert_eq!(store.session, SessionState::default());
    }
}
