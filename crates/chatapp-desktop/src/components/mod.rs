//! UI Components
//!
//! Reusable UI components for the desktop application.

mod chat_item;
mod chat_list;
mod chat_view;
mod form_field;
mod header;
mod profile;
mod spinner;
mod user_search;

pub use chat_item::ChatItem;
pub use chat_list::ChatList;
pub use chat_view::ChatView;
pub use form_field::FormField;
pub use header::Header;
pub use profile::ProfilePanel;
pub use spinner::Spinner;
pub use user_search::UserSearch;
