//! Screens, shell panels and the session gate.

use std::fmt;

use crate::auth::AuthGate;
use crate::models::ChatId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    Login,
    Register,
    #[default]
    Home,
    Chat(ChatId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/reg".to_string(),
            Self::Home => "/".to_string(),
            Self::Chat(id) => format!("/chat/{id}"),
        }
    }

    /// Parse a path; unknown paths fall back to [`Route::Home`]
    pub fn parse(path: &str) -> Self {
        let path = path.trim().trim_end_matches('/');
        match path {
            "" => Self::Home,
            "/login" => Self::Login,
            "/reg" => Self::Register,
            _ => path
                .strip_prefix("/chat/")
                .filter(|id| !id.is_empty() && !id.contains('/'))
                .map_or(Self::Home, |id| Self::Chat(ChatId::new(id))),
        }
    }

    /// Screens reachable without a session
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    pub const fn chat_id(&self) -> Option<&ChatId> {
        match self {
            Self::Chat(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Left-hand panel of the main shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Chats,
    Profile,
    Search,
}

/// Where the gate sends a request for `requested`.
///
/// `None` while auth is still resolving (render the spinner). Public
/// screens are always reachable; signed-out users asking for any other
/// screen land on the login screen.
pub fn resolve_route(gate: &AuthGate, requested: &Route) -> Option<Route> {
    match gate {
        AuthGate::Resolving => None,
        AuthGate::SignedOut if !requested.is_public() => Some(Route::Login),
        AuthGate::SignedOut | AuthGate::SignedIn(_) => Some(requested.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;

    fn signed_in() -> AuthGate {
        AuthGate::SignedIn(AuthUser {
            id: "me".into(),
            email: None,
        })
    }

    #[test]
    fn paths_round_trip() {
        for route in [
            Route::Login,
            Route::Register,
            Route::Home,
            Route::Chat(ChatId::new("abc")),
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn unknown_paths_go_home() {
        assert_eq!(Route::parse("/chat/"), Route::Home);
        assert_eq!(Route::parse("/nowhere"), Route::Home);
    }

    #[test]
    fn resolving_gate_blocks_every_route() {
        assert_eq!(resolve_route(&AuthGate::Resolving, &Route::Home), None);
        assert_eq!(resolve_route(&AuthGate::Resolving, &Route::Login), None);
    }

    #[test]
    fn signed_out_users_are_sent_to_login() {
        let gate = AuthGate::SignedOut;
        assert_eq!(resolve_route(&gate, &Route::Home), Some(Route::Login));
        assert_eq!(
            resolve_route(&gate, &Route::Chat(ChatId::new("c1"))),
            Some(Route::Login)
        );
        assert_eq!(resolve_route(&gate, &Route::Register), Some(Route::Register));
    }

    #[test]
    fn signed_in_users_reach_every_screen() {
        let gate = signed_in();
        let chat = Route::Chat(ChatId::new("c1"));
        assert_eq!(resolve_route(&gate, &chat), Some(chat));
        assert_eq!(resolve_route(&gate, &Route::Home), Some(Route::Home));
        assert_eq!(resolve_route(&gate, &Route::Login), Some(Route::Login));
        assert_eq!(resolve_route(&gate, &Route::Register), Some(Route::Register));
    }
}
