use crate::models::{ChatId, ChatRecord};

use super::Reducer;

/// Banner text when the chat-list query fails
pub const FETCH_CHATS_FAILED: &str = "Failed to fetch chats";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatListAction {
    SetChats(Vec<ChatRecord>),
    SetLoading(bool),
    SetError(Option<String>),
}

/// Most-recent-first chats of the signed-in user, as last pushed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatListState {
    pub chats: Vec<ChatRecord>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ChatListState {
    fn default() -> Self {
        Self {
            chats: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl ChatListState {
    /// The open chat, read from the live list
    pub fn find(&self, id: &ChatId) -> Option<&ChatRecord> {
        self.chats.iter().find(|chat| &chat.id == id)
    }
}

impl Reducer for ChatListState {
    type Action = ChatListAction;

    fn reduce(&mut self, action: ChatListAction) {
        match action {
            ChatListAction::SetChats(chats) => self.chats = chats,
            ChatListAction::SetLoading(loading) => self.loading = loading,
            ChatListAction::SetError(error) => self.error = error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_chats_replaces_list_and_find_reads_it() {
        let mut state = ChatListState::default();
        let chat = ChatRecord::between(ChatId::new("c1"), "a".into(), "b".into());
        state.reduce(ChatListAction::SetChats(vec![chat.clone()]));

        assert_eq!(state.find(&ChatId::new("c1")), Some(&chat));
        assert_eq!(state.find(&ChatId::new("c2")), None);

        state.reduce(ChatListAction::SetChats(Vec::new()));
        assert!(state.chats.is_empty());
    }
}
