//! Message pane of the open chat

use dioxus::prelude::*;

use chatapp_core::chat::{routed_chat, send_message, Composer, SELECT_CHAT_NOTICE};
use chatapp_core::derive::NO_MESSAGES_PLACEHOLDER;
use chatapp_core::models::ChatId;
use chatapp_core::util::format_clock_time;

use crate::services::AppBackend;
use crate::state::AppState;

const MESSAGES_ELEMENT_ID: &str = "chat-messages";

#[component]
pub fn ChatView(chat_id: Option<ChatId>) -> Element {
    let state = use_context::<AppState>();
    let backend = use_context::<AppBackend>();
    let mut composer = use_signal(Composer::default);
    let mut sending = use_signal(|| false);
    let colors = state.palette();

    let store = state.store.read();
    let chat = routed_chat(&store.chats, chat_id.as_ref()).cloned();
    let sender = store.session.user.clone();
    drop(store);

    let message_count = chat.as_ref().map_or(0, |chat| chat.messages.len());
    use_effect(use_reactive!(|message_count| {
        if message_count > 0 {
            let script = format!(
                "const el = document.getElementById('{MESSAGES_ELEMENT_ID}'); if (el) {{ el.scrollTop = el.scrollHeight; }}"
            );
            document::eval(&script);
        }
    }));

    // Unknown ids and chats not yet pushed by the list watch render the notice too
    let Some(chat) = chat else {
        return rsx! {
            div {
                style: "
                    flex: 1;
                    display: flex;
                    align-items: center;
                    justify-content: center;
                    color: {colors.text_muted};
                ",
                "{SELECT_CHAT_NOTICE}"
            }
        };
    };

    let mut send = {
        let chat_id = chat.id.clone();
        let sender = sender.clone();
        move || {
            if sending() || !composer.read().can_send() {
                return;
            }
            let Some(sender) = sender.clone() else {
                tracing::warn!("Cannot send before the session profile has loaded");
                return;
            };
            let backend = backend.clone();
            let chat_id = chat_id.clone();
            let text = composer.read().text.clone();
            sending.set(true);
            spawn(async move {
                let outcome = send_message(&backend, &chat_id, &sender, &text).await;
                composer.write().finish(&outcome);
                sending.set(false);
            });
        }
    };

    let mut send_on_enter = send.clone();

    let own_name = sender.as_ref().map(|user| user.name.clone());
    let messages = chat.messages;
    let draft = composer.read().text.clone();
    let error = composer.read().error.clone();
    let can_send = composer.read().can_send() && !sending();

    rsx! {
        div {
            id: MESSAGES_ELEMENT_ID,
            class: "chat-messages",
            style: "
                flex: 1;
                overflow-y: auto;
                padding: 16px;
                display: flex;
                flex-direction: column;
                gap: 8px;
            ",
            if messages.is_empty() {
                div {
                    style: "margin: auto; color: {colors.text_muted};",
                    "{NO_MESSAGES_PLACEHOLDER}"
                }
            }
            for (index, message) in messages.into_iter().enumerate() {
                {
                    let own = own_name.as_deref().is_some_and(|name| message.is_from(name));
                    let align = if own { "flex-end" } else { "flex-start" };
                    let bubble = if own { colors.own_bubble } else { colors.other_bubble };
                    let time = format_clock_time(message.timestamp);

                    rsx! {
                        div {
                            key: "{index}",
                            style: "
                                align-self: {align};
                                max-width: 70%;
                                padding: 8px 12px;
                                border-radius: 12px;
                                background: {bubble};
                            ",
                            if !own {
                                div {
                                    style: "font-size: 12px; font-weight: 600; color: {colors.text_secondary};",
                                    "{message.name}"
                                }
                            }
                            div { style: "white-space: pre-wrap;", "{message.text}" }
                            div {
                                style: "font-size: 11px; text-align: right; color: {colors.text_muted};",
                                "{time}"
                            }
                        }
                    }
                }
            }
        }
        div {
            class: "composer",
            style: "
                padding: 10px 16px;
                border-top: 1px solid {colors.border};
                background: {colors.bg_primary};
            ",
            if let Some(message) = error {
                div { style: "color: {colors.error}; margin-bottom: 6px;", "{message}" }
            }
            div {
                style: "display: flex; gap: 8px;",
                input {
                    r#type: "text",
                    placeholder: "Type a message",
                    value: "{draft}",
                    style: "
                        flex: 1;
                        padding: 8px 10px;
                        border: 1px solid {colors.border};
                        border-radius: 6px;
                        background: {colors.bg_secondary};
                        color: {colors.text_primary};
                    ",
                    oninput: move |evt| composer.write().text = evt.value(),
                    onkeydown: move |evt: Event<KeyboardData>| {
                        if evt.key() == Key::Enter && !evt.modifiers().shift() {
                            evt.prevent_default();
                            send_on_enter();
                        }
                    },
                }
                button {
                    disabled: !can_send,
                    style: "
                        padding: 8px 16px;
                        border: none;
                        border-radius: 6px;
                        background: {colors.accent};
                        color: {colors.accent_text};
                        cursor: pointer;
                    ",
                    onclick: move |_| send(),
                    "Send"
                }
            }
        }
    }
}
