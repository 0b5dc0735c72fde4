//! ChatApp Desktop Application
//!
//! One-to-one chat client. Talks to Supabase when configured, otherwise to
//! an in-memory backend seeded with demo accounts.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod components;
mod services;
mod state;
mod theme;
mod views;

use chatapp_core::config::ClientConfig;
use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use tracing_subscriber::EnvFilter;

use services::AppBackend;

fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "chatapp=debug".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting ChatApp...");

    let backend = match ClientConfig::from_env().and_then(|config| AppBackend::from_config(&config)) {
        Ok(backend) => backend,
        Err(error) => {
            tracing::error!("Failed to configure backend: {}", error);
            std::process::exit(1);
        }
    };

    let config = Config::new().with_window(
        WindowBuilder::new()
            .with_title("ChatApp")
            .with_inner_size(LogicalSize::new(1100.0, 720.0)),
    );

    dioxus::LaunchBuilder::new()
        .with_cfg(config)
        .with_context(backend)
        .launch(app::App);
}
