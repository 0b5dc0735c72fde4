//! Application state management
//!
//! Global state accessible via Dioxus context providers.

use dioxus::prelude::*;

use chatapp_core::auth::AuthGate;
use chatapp_core::models::Theme;
use chatapp_core::route::{Panel, Route};
use chatapp_core::store::{AppAction, AppStore};

use crate::theme::{palette, ColorPalette};

/// Global application state
#[derive(Clone, Copy)]
pub struct AppState {
    /// Theme, session and chat-list stores
    pub store: Signal<AppStore>,
    /// Process-wide authentication state
    pub auth: Signal<AuthGate>,
    /// Requested screen; the auth gate decides what is actually shown
    pub route: Signal<Route>,
    /// Left-hand panel of the main shell
    pub panel: Signal<Panel>,
}

impl AppState {
    pub fn dispatch(&self, action: impl Into<AppAction>) {
        let mut store = self.store;
        store.write().dispatch(action);
    }

    pub fn theme(&self) -> Theme {
        self.store.read().theme.theme
    }

    pub fn palette(&self) -> &'static ColorPalette {
        palette(self.theme())
    }

    pub fn navigate(&self, route: Route) {
        tracing::debug!("Navigating to {}", route);
        let mut current = self.route;
        current.set(route);
    }

    pub fn show_panel(&self, panel: Panel) {
        let mut current = self.panel;
        current.set(panel);
    }

    /// Drop per-user state after sign-out
    pub fn reset_session(&self) {
        let mut store = self.store;
        store.write().reset_session();
    }
}
