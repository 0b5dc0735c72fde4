//! The backend selected at startup, shared with every view through context.

use chatapp_core::auth::AuthUser;
use chatapp_core::backend::{
    AuthProvider, BackendResult, ChatQuery, ChatUpdate, DocumentStore, MemoryBackend,
    Subscription, SupabaseBackend,
};
use chatapp_core::config::{BackendMode, ClientConfig};
use chatapp_core::models::{ChatId, ChatRecord, NewChat, UserId, UserPatch, UserProfile};

use super::KeyringSessionStore;

#[derive(Clone)]
pub enum AppBackend {
    Memory(MemoryBackend),
    Supabase(SupabaseBackend<KeyringSessionStore>),
}

impl AppBackend {
    pub fn from_config(config: &ClientConfig) -> chatapp_core::Result<Self> {
        match config.backend_mode()? {
            BackendMode::InMemory => {
                tracing::info!("No Supabase project configured; using in-memory demo backend");
                Ok(Self::Memory(MemoryBackend::with_demo_data()))
            }
            BackendMode::Supabase(supabase) => {
                tracing::info!("Using Supabase backend at {}", supabase.url);
                let backend = SupabaseBackend::new(&supabase, KeyringSessionStore::default())?;
                Ok(Self::Supabase(backend))
            }
        }
    }

    /// Pick up a persisted session before the auth gate resolves
    pub async fn restore_session(&self) {
        if let Self::Supabase(backend) = self {
            match backend.restore_session().await {
                Ok(Some(user)) => tracing::info!("Restored session for {}", user.id),
                Ok(None) => {}
                Err(error) => tracing::warn!("Failed to restore session: {}", error),
            }
        }
    }
}

impl AuthProvider for AppBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        match self {
            Self::Memory(backend) => backend.sign_in(email, password).await,
            Self::Supabase(backend) => backend.sign_in(email, password).await,
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        match self {
            Self::Memory(backend) => backend.sign_up(email, password).await,
            Self::Supabase(backend) => backend.sign_up(email, password).await,
        }
    }

    async fn sign_out(&self) -> BackendResult<()> {
        match self {
            Self::Memory(backend) => backend.sign_out().await,
            Self::Supabase(backend) => backend.sign_out().await,
        }
    }

    fn current_user(&self) -> Option<AuthUser> {
        match self {
            Self::Memory(backend) => backend.current_user(),
            Self::Supabase(backend) => backend.current_user(),
        }
    }

    fn watch_auth(&self) -> Subscription<Option<AuthUser>> {
        match self {
            Self::Memory(backend) => backend.watch_auth(),
            Self::Supabase(backend) => backend.watch_auth(),
        }
    }
}

impl DocumentStore for AppBackend {
    async fn get_user(&self, id: &UserId) -> BackendResult<Option<UserProfile>> {
        match self {
            Self::Memory(backend) => backend.get_user(id).await,
            Self::Supabase(backend) => backend.get_user(id).await,
        }
    }

    async fn list_users(&self) -> BackendResult<Vec<UserProfile>> {
        match self {
            Self::Memory(backend) => backend.list_users().await,
            Self::Supabase(backend) => backend.list_users().await,
        }
    }

    async fn merge_user(&self, id: &UserId, patch: &UserPatch) -> BackendResult<()> {
        match self {
            Self::Memory(backend) => backend.merge_user(id, patch).await,
            Self::Supabase(backend) => backend.merge_user(id, patch).await,
        }
    }

    fn watch_user(&self, id: &UserId) -> Subscription<Option<UserProfile>> {
        match self {
            Self::Memory(backend) => backend.watch_user(id),
            Self::Supabase(backend) => backend.watch_user(id),
        }
    }

    async fn query_chats(&self, query: &ChatQuery) -> BackendResult<Vec<ChatRecord>> {
        match self {
            Self::Memory(backend) => backend.query_chats(query).await,
            Self::Supabase(backend) => backend.query_chats(query).await,
        }
    }

    fn watch_chats(&self, query: &ChatQuery) -> Subscription<Vec<ChatRecord>> {
        match self {
            Self::Memory(backend) => backend.watch_chats(query),
            Self::Supabase(backend) => backend.watch_chats(query),
        }
    }

    async fn create_chat(&self, chat: &NewChat) -> BackendResult<ChatId> {
        match self {
            Self::Memory(backend) => backend.create_chat(chat).await,
            Self::Supabase(backend) => backend.create_chat(chat).await,
        }
    }

    async fn update_chat(&self, id: &ChatId, update: &ChatUpdate) -> BackendResult<()> {
        match self {
            Self::Memory(backend) => backend.update_chat(id, update).await,
            Self::Supabase(backend) => backend.update_chat(id, update).await,
        }
    }
}
