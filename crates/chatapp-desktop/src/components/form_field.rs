//! Labelled text input with an inline validation message

use dioxus::prelude::*;

use crate::state::AppState;

#[component]
pub fn FormField(
    label: String,
    value: String,
    #[props(default = "text".to_string())] input_type: String,
    #[props(default)] placeholder: String,
    error: Option<String>,
    oninput: EventHandler<String>,
) -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let border = if error.is_some() {
        colors.error
    } else {
        colors.border
    };

    rsx! {
        label {
            style: "
                display: flex;
                flex-direction: column;
                gap: 4px;
                margin-bottom: 12px;
                color: {colors.text_secondary};
            ",
            "{label}"
            input {
                r#type: "{input_type}",
                value: "{value}",
                placeholder: "{placeholder}",
                style: "
                    padding: 8px 10px;
                    border: 1px solid {border};
                    border-radius: 6px;
                    background: {colors.bg_primary};
                    color: {colors.text_primary};
                ",
                oninput: move |evt| oninput.call(evt.value()),
            }
            if let Some(message) = error {
                span {
                    style: "color: {colors.error}; font-size: 12px;",
                    "{message}"
                }
            }
        }
    }
}
