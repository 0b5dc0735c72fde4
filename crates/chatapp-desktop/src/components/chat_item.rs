//! One row of the chat list

use dioxus::prelude::*;

use chatapp_core::derive::ChatListEntry;
use chatapp_core::util::format_clock_time;

use crate::state::AppState;

#[component]
pub fn ChatItem(entry: ChatListEntry, is_selected: bool, onclick: EventHandler<MouseEvent>) -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let background = if is_selected {
        colors.bg_tertiary
    } else {
        "transparent"
    };
    let weight = if entry.unread { "600" } else { "400" };
    let time = entry
        .last_message_timestamp
        .map(format_clock_time)
        .unwrap_or_default();

    rsx! {
        div {
            class: "chat-item",
            style: "
                display: flex;
                align-items: center;
                gap: 10px;
                padding: 10px 14px;
                cursor: pointer;
                border-bottom: 1px solid {colors.border};
                background: {background};
            ",
            onclick: move |evt| onclick.call(evt),
            img {
                src: "{entry.avatar_url}",
                alt: "",
                style: "width: 40px; height: 40px; border-radius: 50%; object-fit: cover;",
            }
            div {
                style: "flex: 1; min-width: 0;",
                div {
                    style: "display: flex; justify-content: space-between; gap: 8px;",
                    span { style: "font-weight: {weight};", "{entry.name}" }
                    span { style: "font-size: 12px; color: {colors.text_muted};", "{time}" }
                }
                div {
                    style: "
                        font-size: 13px;
                        color: {colors.text_secondary};
                        font-weight: {weight};
                        white-space: nowrap;
                        overflow: hidden;
                        text-overflow: ellipsis;
                    ",
                    "{entry.preview}"
                }
            }
            if entry.unread {
                span {
                    class: "unread-badge",
                    title: "Unread",
                    style: "
                        width: 10px;
                        height: 10px;
                        border-radius: 50%;
                        background: {colors.unread};
                    ",
                }
            }
        }
    }
}
