//! Profile panel: avatar picker and display name

use dioxus::prelude::*;

use chatapp_core::models::{UserProfile, AVATAR_PRESETS};
use chatapp_core::profile::{
    save_profile, ProfileEditor, PROFILE_SAVED_NOTICE, PROFILE_SAVE_FAILED_NOTICE,
};
use chatapp_core::Error;

use super::FormField;
use crate::services::AppBackend;
use crate::state::AppState;

/// Outcome banner under the form
#[derive(Debug, Clone, PartialEq)]
enum Notice {
    Saved,
    Failed,
}

#[component]
pub fn ProfilePanel() -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let profile = state.store.read().session.user.clone();

    match profile {
        Some(profile) => {
            let key = profile.id.to_string();
            rsx! {
                ProfileEditorForm { key: "{key}", profile }
            }
        }
        None => rsx! {
            div { style: "padding: 20px; color: {colors.text_muted};", "Loading profile..." }
        },
    }
}

#[component]
fn ProfileEditorForm(profile: UserProfile) -> Element {
    let state = use_context::<AppState>();
    let backend = use_context::<AppBackend>();
    let mut editor = use_signal(|| ProfileEditor::new(&profile));
    let mut notice = use_signal(|| None::<Notice>);
    let mut saving = use_signal(|| false);
    let colors = state.palette();

    // Pick up the saved record once it arrives through the user watch
    use_effect(use_reactive!(|profile| {
        editor.write().rebase(&profile);
    }));

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() {
            return;
        }
        let backend = backend.clone();
        let profile = profile.clone();
        let snapshot = editor();
        saving.set(true);
        spawn(async move {
            match save_profile(&backend, &profile, &snapshot).await {
                Ok(_) => notice.set(Some(Notice::Saved)),
                Err(Error::NoChanges | Error::Validation(_)) => notice.set(None),
                Err(_) => notice.set(Some(Notice::Failed)),
            }
            saving.set(false);
        });
    };

    let current = editor();
    let errors = current.errors();
    let can_save = current.has_changes() && errors.is_empty() && !saving();

    rsx! {
        form {
            class: "profile-panel",
            style: "padding: 16px;",
            onsubmit: submit,
            h3 { style: "margin-top: 0;", "Profile" }
            div {
                style: "display: flex; gap: 12px; margin-bottom: 16px;",
                for (index, avatar) in AVATAR_PRESETS.iter().enumerate() {
                    {
                        let selected = current.values.avatar_url == *avatar;
                        let outline = if selected { colors.accent } else { "transparent" };
                        let alt = format!("Avatar {}", index + 1);

                        rsx! {
                            img {
                                key: "{avatar}",
                                src: "{avatar}",
                                alt: "{alt}",
                                style: "
                                    width: 56px;
                                    height: 56px;
                                    border-radius: 50%;
                                    cursor: pointer;
                                    border: 3px solid {outline};
                                ",
                                onclick: move |_| {
                                    notice.set(None);
                                    editor.write().select_avatar(index);
                                },
                            }
                        }
                    }
                }
            }
            FormField {
                label: "Name",
                value: current.values.name.clone(),
                error: errors.get("name").map(str::to_string),
                oninput: move |value| {
                    notice.set(None);
                    editor.write().values.name = value;
                },
            }
            button {
                r#type: "submit",
                disabled: !can_save,
                style: "
                    padding: 8px 16px;
                    border: none;
                    border-radius: 6px;
                    background: {colors.accent};
                    color: {colors.accent_text};
                    cursor: pointer;
                ",
                if saving() { "Saving..." } else { "Save" }
            }
            match notice() {
                Some(Notice::Saved) => rsx! {
                    p { style: "color: {colors.success};", "{PROFILE_SAVED_NOTICE}" }
                },
                Some(Notice::Failed) => rsx! {
                    p { style: "color: {colors.error};", "{PROFILE_SAVE_FAILED_NOTICE}" }
                },
                None => rsx! {},
            }
        }
    }
}
