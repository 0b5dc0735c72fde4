//! Top-level screens

mod login;
mod main_shell;
mod register;

pub use login::LoginView;
pub use main_shell::MainShell;
pub use register::RegisterView;
