//! Loading indicator shown while the auth gate resolves

use dioxus::prelude::*;

use crate::state::AppState;

#[component]
pub fn Spinner() -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();

    rsx! {
        div {
            class: "spinner-container",
            style: "
                display: flex;
                align-items: center;
                justify-content: center;
                height: 100vh;
            ",
            div {
                class: "spinner",
                role: "status",
                style: "
                    width: 40px;
                    height: 40px;
                    border: 4px solid {colors.border};
                    border-top-color: {colors.accent};
                    border-radius: 50%;
                ",
            }
        }
    }
}
