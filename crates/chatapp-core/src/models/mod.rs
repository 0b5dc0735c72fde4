//! Data models for ChatApp

mod chat;
mod theme;
mod user;

pub use chat::{ChatId, ChatRecord, Message, NewChat};
pub use theme::Theme;
pub use user::{UserId, UserPatch, UserProfile, AVATAR_PRESETS, DEFAULT_AVATAR};
