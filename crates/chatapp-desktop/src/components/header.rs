//! Shell header: panel switches, theme toggle and sign-out

use dioxus::prelude::*;

use chatapp_core::auth;
use chatapp_core::route::{Panel, Route};
use chatapp_core::store::ThemeAction;

use crate::services::AppBackend;
use crate::state::AppState;

#[component]
pub fn Header() -> Element {
    let state = use_context::<AppState>();
    let backend = use_context::<AppBackend>();
    let colors = state.palette();
    let theme = state.theme();
    let current = (state.panel)();
    let name = state
        .store
        .read()
        .session
        .display_name()
        .map(str::to_string);

    let exit = move |_| {
        let backend = backend.clone();
        spawn(async move {
            auth::sign_out(&backend).await;
            state.navigate(Route::Login);
        });
    };

    let panel_button = move |panel: Panel, label: &'static str| {
        let active = current == panel;
        let background = if active { colors.accent } else { "transparent" };
        let color = if active {
            colors.accent_text
        } else {
            colors.text_primary
        };
        rsx! {
            button {
                style: "
                    padding: 6px 12px;
                    border: 1px solid {colors.border};
                    border-radius: 6px;
                    background: {background};
                    color: {color};
                    cursor: pointer;
                ",
                onclick: move |_| state.show_panel(panel),
                "{label}"
            }
        }
    };

    rsx! {
        header {
            style: "
                display: flex;
                align-items: center;
                gap: 8px;
                padding: 10px 16px;
                border-bottom: 1px solid {colors.border};
                background: {colors.bg_primary};
            ",
            strong { style: "margin-right: auto;", "ChatApp" }
            if let Some(name) = name {
                span { style: "color: {colors.text_secondary};", "{name}" }
            }
            {panel_button(Panel::Chats, "Chats")}
            {panel_button(Panel::Search, "Find users")}
            {panel_button(Panel::Profile, "Profile")}
            button {
                title: "Toggle theme",
                style: "
                    padding: 6px 10px;
                    border: 1px solid {colors.border};
                    border-radius: 6px;
                    background: transparent;
                    color: {colors.text_primary};
                    cursor: pointer;
                ",
                onclick: move |_| state.dispatch(ThemeAction::Toggle),
                if theme.is_dark() { "Light" } else { "Dark" }
            }
            button {
                style: "
                    padding: 6px 12px;
                    border: none;
                    border-radius: 6px;
                    background: {colors.error};
                    color: {colors.accent_text};
                    cursor: pointer;
                ",
                onclick: exit,
                "Exit"
            }
        }
    }
}
