//! Main application component

use dioxus::prelude::*;

use chatapp_core::auth::AuthGate;
use chatapp_core::backend::AuthProvider;
use chatapp_core::route::{resolve_route, Panel, Route};
use chatapp_core::store::AppStore;

use crate::components::Spinner;
use crate::services::AppBackend;
use crate::state::AppState;
use crate::views::{LoginView, MainShell, RegisterView};

/// Root application component
#[component]
pub fn App() -> Element {
    let backend = use_context::<AppBackend>();
    let store = use_signal(AppStore::default);
    let mut auth = use_signal(AuthGate::default);
    let route = use_signal(Route::default);
    let panel = use_signal(Panel::default);

    let state = use_context_provider(|| AppState {
        store,
        auth,
        route,
        panel,
    });

    // Observe authentication state for the lifetime of the window
    use_future(move || {
        let backend = backend.clone();
        async move {
            backend.restore_session().await;
            let mut watch = backend.watch_auth();
            while let Some(user) = watch.next().await {
                match &user {
                    Some(user) => tracing::info!("Auth state: signed in as {}", user.id),
                    None => {
                        tracing::info!("Auth state: signed out");
                        state.reset_session();
                    }
                }
                auth.set(AuthGate::from_snapshot(user));
            }
        }
    });

    let theme = state.theme();
    let theme_attr = theme.as_str();
    let background = theme.background_image();
    let colors = state.palette();
    let gate = auth();

    let content = match resolve_route(&gate, &route()) {
        None => rsx! {
            Spinner {}
        },
        Some(Route::Login) => rsx! {
            LoginView {}
        },
        Some(Route::Register) => rsx! {
            RegisterView {}
        },
        Some(shown) => match gate.user() {
            Some(user) => rsx! {
                MainShell {
                    user_id: user.id.clone(),
                    chat_id: shown.chat_id().cloned(),
                }
            },
            None => rsx! {
                Spinner {}
            },
        },
    };

    rsx! {
        div {
            class: "app-container",
            "data-theme": "{theme_attr}",
            style: "
                min-height: 100vh;
                font-family: system-ui, -apple-system, sans-serif;
                font-size: 14px;
                background-color: {colors.bg_secondary};
                background-image: url('{background}');
                background-size: cover;
                color: {colors.text_primary};
            ",
            {content}
        }
    }
}
