//! Account registration screen

use dioxus::prelude::*;

use chatapp_core::auth;
use chatapp_core::forms::{FieldErrors, RegistrationForm};
use chatapp_core::route::Route;

use crate::components::FormField;
use crate::services::AppBackend;
use crate::state::AppState;

#[component]
pub fn RegisterView() -> Element {
    let state = use_context::<AppState>();
    let backend = use_context::<AppBackend>();
    let mut form = use_signal(RegistrationForm::default);
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
            match auth::register(&backend, &values).await {
                Ok(_) => {
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
    let error_for = move |field: &str| field_errors.get(field).map(str::to_string);

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
                    width: 340px;
                    padding: 24px;
                    border-radius: 12px;
                    background: {colors.bg_primary};
                    border: 1px solid {colors.border};
                ",
                h2 { style: "margin-top: 0;", "Create account" }
                FormField {
                    label: "Name",
                    value: values.name,
                    error: error_for("name"),
                    oninput: move |value| form.write().name = value,
                }
                FormField {
                    label: "Email",
                    value: values.email,
                    input_type: "email",
                    error: error_for("email"),
                    oninput: move |value| form.write().email = value,
                }
                FormField {
                    label: "Password",
                    value: values.password,
                    input_type: "password",
                    error: error_for("password"),
                    oninput: move |value| form.write().password = value,
                }
                FormField {
                    label: "Confirm password",
                    value: values.confirm_password,
                    input_type: "password",
                    error: error_for("confirm_password"),
                    oninput: move |value| form.write().confirm_password = value,
                }
                if let Some(message) = error_for("form") {
                    p { style: "color: {colors.error};", "{message}" }
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
                    if submitting() { "Creating account..." } else { "Register" }
                }
                p {
                    style: "margin-bottom: 0; color: {colors.text_secondary};",
                    "Already registered? "
                    a {
                        href: "#",
                        style: "color: {colors.accent};",
                        onclick: move |evt| {
                            evt.prevent_default();
                            state.navigate(Route::Login);
                        },
                        "Sign in"
                    }
                }
            }
        }
    }
}
