//! User directory: find someone and open the chat with them

use dioxus::prelude::*;

use chatapp_core::backend::DocumentStore;
use chatapp_core::chat::open_direct_chat;
use chatapp_core::derive::filter_users;
use chatapp_core::models::{UserId, DEFAULT_AVATAR};
use chatapp_core::route::{Panel, Route};

use crate::services::AppBackend;
use crate::state::AppState;

#[component]
pub fn UserSearch() -> Element {
    let state = use_context::<AppState>();
    let backend = use_context::<AppBackend>();
    let mut query = use_signal(String::new);
    let mut opening = use_signal(|| false);
    let colors = state.palette();

    let list_backend = backend.clone();
    let users = use_resource(move || {
        let backend = list_backend.clone();
        async move {
            backend.list_users().await.map_err(|error| {
                tracing::error!("Error fetching users: {}", error);
                error.to_string()
            })
        }
    });

    let viewer = state
        .store
        .read()
        .session
        .user
        .as_ref()
        .map(|user| user.id.clone());

    let viewer_id = viewer.clone();
    let open = move |target: UserId| {
        let Some(viewer) = viewer.clone() else {
            return;
        };
        if opening() {
            return;
        }
        let backend = backend.clone();
        opening.set(true);
        spawn(async move {
            match open_direct_chat(&backend, &viewer, &target).await {
                Ok(chat) => {
                    state.show_panel(Panel::Chats);
                    state.navigate(Route::Chat(chat.id().clone()));
                }
                Err(error) => tracing::error!("Error opening chat with {}: {}", target, error),
            }
            opening.set(false);
        });
    };

    let body = match &*users.read() {
        None => rsx! {
            div { style: "padding: 20px; color: {colors.text_muted};", "Loading users..." }
        },
        Some(Err(_)) => rsx! {
            div { style: "padding: 20px; color: {colors.error};", "Failed to load users" }
        },
        Some(Ok(all)) => {
            let matches: Vec<_> = viewer_id
                .map(|viewer| {
                    filter_users(all, &viewer, &query())
                        .into_iter()
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            rsx! {
                if matches.is_empty() {
                    div {
                        style: "padding: 20px; text-align: center; color: {colors.text_muted};",
                        "No users found"
                    }
                }
                for user in matches {
                    {
                        let id = user.id.clone();
                        let avatar = user.avatar_url.clone().unwrap_or_else(|| DEFAULT_AVATAR.to_string());
                        let mut open = open.clone();

                        rsx! {
                            div {
                                key: "{user.id}",
                                class: "user-item",
                                style: "
                                    display: flex;
                                    align-items: center;
                                    gap: 10px;
                                    padding: 10px 14px;
                                    cursor: pointer;
                                    border-bottom: 1px solid {colors.border};
                                ",
                                onclick: move |_| open(id.clone()),
                                img {
                                    src: "{avatar}",
                                    alt: "",
                                    style: "width: 36px; height: 36px; border-radius: 50%;",
                                }
                                span { "{user.name}" }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        div {
            class: "user-search",
            style: "display: flex; flex-direction: column; min-height: 0; flex: 1;",
            input {
                r#type: "search",
                placeholder: "Search users by name",
                value: "{query}",
                style: "
                    margin: 10px;
                    padding: 8px 10px;
                    border: 1px solid {colors.border};
                    border-radius: 6px;
                    background: {colors.bg_secondary};
                    color: {colors.text_primary};
                ",
                oninput: move |evt| query.set(evt.value()),
            }
            div {
                style: "overflow-y: auto; flex: 1;",
                {body}
            }
        }
    }
}
