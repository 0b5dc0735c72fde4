//! Chat list panel with name filter and unread markers

use dioxus::prelude::*;

use chatapp_core::chat::{fetch_profiles, open_listed_chat};
use chatapp_core::derive::{derive_chat_list, ProfileCache};
use chatapp_core::models::ChatId;
use chatapp_core::route::Route;

use super::ChatItem;
use crate::services::AppBackend;
use crate::state::AppState;

#[component]
pub fn ChatList(selected: Option<ChatId>) -> Element {
    let state = use_context::<AppState>();
    let backend = use_context::<AppBackend>();
    let mut cache = use_signal(ProfileCache::default);
    let mut filter = use_signal(String::new);
    let colors = state.palette();

    // Fetch profiles of participants not seen yet whenever the chats change
    let fetch_backend = backend.clone();
    use_effect(move || {
        let store = state.store.read();
        let Some(viewer) = store.session.user.as_ref().map(|user| user.id.clone()) else {
            return;
        };
        let pending = cache.write().take_pending(&store.chats.chats, &viewer);
        drop(store);
        if pending.is_empty() {
            return;
        }
        let backend = fetch_backend.clone();
        spawn(async move {
            for profile in fetch_profiles(&backend, &pending).await {
                cache.write().insert(profile);
            }
        });
    });

    let store = state.store.read();
    let viewer = store.session.user.as_ref().map(|user| user.id.clone());
    let loading = store.chats.loading;
    let entries = viewer
        .as_ref()
        .map(|viewer| {
            derive_chat_list(
                &store.chats.chats,
                viewer,
                store.session.display_name(),
                &cache.read(),
                &filter(),
            )
        })
        .unwrap_or_default();
    drop(store);

    rsx! {
        div {
            class: "chat-list",
            style: "display: flex; flex-direction: column; min-height: 0; flex: 1;",
            input {
                r#type: "search",
                placeholder: "Filter chats",
                value: "{filter}",
                style: "
                    margin: 10px;
                    padding: 8px 10px;
                    border: 1px solid {colors.border};
                    border-radius: 6px;
                    background: {colors.bg_secondary};
                    color: {colors.text_primary};
                ",
                oninput: move |evt| filter.set(evt.value()),
            }
            div {
                style: "overflow-y: auto; flex: 1;",
                if loading && entries.is_empty() {
                    div {
                        style: "padding: 20px; text-align: center; color: {colors.text_muted};",
                        "Loading chats..."
                    }
                } else if entries.is_empty() {
                    div {
                        style: "padding: 20px; text-align: center; color: {colors.text_muted};",
                        "No chats yet"
                    }
                } else {
                    for entry in entries {
                        {
                            let chat_id = entry.chat_id.clone();
                            let target = chat_id.clone();
                            let is_selected = selected.as_ref() == Some(&chat_id);
                            let backend = backend.clone();
                            let viewer = viewer.clone();

                            rsx! {
                                ChatItem {
                                    key: "{chat_id}",
                                    entry,
                                    is_selected,
                                    onclick: move |_| {
                                        let Some(viewer) = viewer.clone() else {
                                            return;
                                        };
                                        let backend = backend.clone();
                                        let chat_id = target.clone();
                                        spawn(async move {
                                            // A failed read-marker write is logged and the view stays put
                                            if let Ok(opened) = open_listed_chat(&backend, &chat_id, &viewer).await {
                                                state.navigate(Route::Chat(opened));
                                            }
                                        });
                                    },
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
