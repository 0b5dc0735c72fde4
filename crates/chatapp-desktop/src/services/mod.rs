//! Application services
//!
//! The backend handle shared through context and the keyring session store.

mod backend;
mod session_store;

pub use backend::AppBackend;
pub use session_store::KeyringSessionStore;
