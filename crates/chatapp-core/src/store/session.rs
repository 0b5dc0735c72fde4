use crate::models::UserProfile;

use super::Reducer;

/// Banner text when the session user's record cannot be loaded
pub const FETCH_USER_FAILED: &str = "Failed to fetch user data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    SetUserData(Option<UserProfile>),
    SetLoading(bool),
    SetError(Option<String>),
}

/// The signed-in user's profile record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            error: None,
        }
    }
}

impl SessionState {
    pub fn display_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.name.as_str())
    }
}

impl Reducer for SessionState {
    type Action = SessionAction;

    fn reduce(&mut self, action: SessionAction) {
        match action {
            SessionAction::SetUserData(user) => self.user = user,
            SessionAction::SetLoading(loading) => self.loading = loading,
            SessionAction::SetError(error) => self.error = error,
        }
    }
}
