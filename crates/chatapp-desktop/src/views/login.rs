//! Sign-in screen

use dioxus::prelude::*;

use chatapp_core::auth;
use chatapp_core::forms::{FieldErrors, LoginForm};
use chatapp_core::route::Route;

use crate::components::FormField;
use crate::services::AppBackend;
use crate::state::AppState;

#[component]
pub fn LoginView() -> Element {
    let state = use_context::<AppState>();
    let backend = use_context::<AppBackend>();
    let mut form = use_signal(LoginForm::default);
    let mut errors = use_signal(FieldErrors::default);
    let mut submitting = use_signal(|| false);
    let colors = state.palette();

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        let backend = backend.clone();
        let values = form();
        submitting.set(true);
        spawn(async move {
            match auth::sign_in(&backend, &values).await {
                Ok(user) => {
                    tracing::info!("Signed in as {}", user.id);
                    errors.set(FieldErrors::default());
                    state.navigate(Route::Home);
                }
                Err(failed) => errors.set(failed),
            }
            submitting.set(false);
        });
    };

    let values = form();
    let field_errors = errors();

    rsx! {
        div {
            class: "auth-screen",
            style: "
                display: flex;
                align-items: center;
                justify-content: center;
                min-height: 100vh;
            ",
            form {
                onsubmit: submit,
                style: "
                    width: 320px;
                    padding: 24px;
                    border-radius: 12px;
                    background: {colors.bg_primary};
                    border: 1px solid {colors.border};
                ",
                h2 { style: "margin-top: 0;", "Sign in" }
                FormField {
                    label: "Email",
                    value: values.email,
                    input_type: "email",
                    error: field_errors.get("email").map(str::to_string),
                    oninput: move |value| form.write().email = value,
                }
                FormField {
                    label: "Password",
                    value: values.password,
                    input_type: "password",
                    error: field_errors.get("password").map(str::to_string),
                    oninput: move |value| form.write().password = value,
                }
                button {
                    r#type: "submit",
                    disabled: submitting(),
                    style: "
                        width: 100%;
                        padding: 10px;
                        border: none;
                        border-radius: 6px;
                        background: {colors.accent};
                        color: {colors.accent_text};
                        cursor: pointer;
                    ",
                    if submitting() { "Signing in..." } else { "Sign in" }
                }
                p {
                    style: "margin-bottom: 0; color: {colors.text_secondary};",
                    "No account? "
                    a {
                        href: "#",
                        style: "color: {colors.accent};",
                        onclick: move |evt| {
                            evt.prevent_default();
                            state.navigate(Route::Register);
                        },
                        "Register"
                    }
                }
            }
        }
    }
}
