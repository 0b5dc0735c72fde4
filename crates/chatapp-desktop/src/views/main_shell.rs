//! Signed-in shell: header, left panel and the message pane

use dioxus::prelude::*;

use chatapp_core::models::{ChatId, UserId};
use chatapp_core::route::Panel;
use chatapp_core::sync::start_shell_sync;

use crate::components::{ChatList, ChatView, Header, ProfilePanel, Spinner, UserSearch};
use crate::services::AppBackend;
use crate::state::AppState;

/// Main shell for a signed-in user.
///
/// Owns the session-user and recent-chats watches; they are dropped with
/// the component on sign-out.
#[component]
pub fn MainShell(user_id: UserId, chat_id: Option<ChatId>) -> Element {
    let state = use_context::<AppState>();
    let backend = use_context::<AppBackend>();

    use_future(move || {
        let backend = backend.clone();
        let user_id = user_id.clone();
        async move {
            let shell = start_shell_sync(&backend, &user_id, |action| state.dispatch(action)).await;
            shell.run(|action| state.dispatch(action)).await;
            tracing::debug!("Shell watches closed for {}", user_id);
        }
    });

    let colors = state.palette();
    let store = state.store.read();
    let banner = store
        .session
        .error
        .clone()
        .or_else(|| store.chats.error.clone());
    let loading = store.shell_loading();
    drop(store);

    if loading {
        return rsx! {
            Spinner {}
        };
    }

    let panel = (state.panel)();
    let pane_key = chat_id.as_ref().map_or("", ChatId::as_str).to_string();

    rsx! {
        div {
            class: "main-shell",
            style: "
                display: flex;
                flex-direction: column;
                height: 100vh;
            ",
            Header {}

            if let Some(message) = banner {
                div {
                    class: "error-banner",
                    role: "alert",
                    style: "
                        padding: 8px 16px;
                        background: {colors.error};
                        color: {colors.accent_text};
                    ",
                    "{message}"
                }
            }

            div {
                style: "display: flex; flex: 1; min-height: 0;",
                aside {
                    style: "
                        width: 320px;
                        display: flex;
                        flex-direction: column;
                        border-right: 1px solid {colors.border};
                        background: {colors.bg_primary};
                    ",
                    match panel {
                        Panel::Chats => rsx! { ChatList { selected: chat_id.clone() } },
                        Panel::Search => rsx! { UserSearch {} },
                        Panel::Profile => rsx! { ProfilePanel {} },
                    }
                }
                main {
                    style: "flex: 1; display: flex; flex-direction: column; min-width: 0;",
                    ChatView {
                        key: "{pane_key}",
                        chat_id: chat_id.clone(),
                    }
                }
            }
        }
    }
}
