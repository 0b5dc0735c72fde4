//! chatapp-core - Core library for ChatApp
//!
//! This crate contains the shared models, state stores, backend adapters and
//! chat logic used by the ChatApp user interfaces.

pub mod auth;
pub mod backend;
pub mod chat;
pub mod config;
pub mod derive;
pub mod error;
pub mod forms;
pub mod models;
pub mod profile;
pub mod route;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{ChatId, ChatRecord, Message, Theme, UserId, UserProfile};
