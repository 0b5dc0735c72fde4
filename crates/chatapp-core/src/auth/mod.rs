//! Authentication: session types, the startup auth gate, and the sign-in,
//! registration and sign-out flows used by the login screens.

pub(crate) mod supabase;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::backend::{AuthProvider, BackendResult, DocumentStore};
use crate::forms::{FieldErrors, LoginForm, RegistrationForm};
use crate::models::{UserId, UserPatch, DEFAULT_AVATAR};
use crate::util::unix_timestamp_now;

pub use supabase::{normalize_auth_url, SignUpOutcome, SupabaseAuthClient};

const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Form error shown for every sign-in failure, whatever the cause
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Storage for the remote backend's session between runs
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> BackendResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> BackendResult<()>;
    fn clear_session(&self) -> BackendResult<()>;
}

/// Process-local session storage (tests, and builds without a keyring)
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Arc<Mutex<Option<AuthSession>>>,
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> BackendResult<Option<AuthSession>> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_session(&self, session: &AuthSession) -> BackendResult<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> BackendResult<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Process-wide authentication state as seen by the shell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthGate {
    /// No auth snapshot received yet; the UI blocks on a spinner
    #[default]
    Resolving,
    SignedOut,
    SignedIn(AuthUser),
}

impl AuthGate {
    pub fn from_snapshot(user: Option<AuthUser>) -> Self {
        user.map_or(Self::SignedOut, Self::SignedIn)
    }

    pub const fn is_resolving(&self) -> bool {
        matches!(self, Self::Resolving)
    }

    pub const fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::Resolving | Self::SignedOut => None,
        }
    }
}

/// Validate `form` and sign in.
///
/// Backend failures of any kind collapse into [`INVALID_CREDENTIALS`].
pub async fn sign_in<A: AuthProvider>(auth: &A, form: &LoginForm) -> Result<AuthUser, FieldErrors> {
    form.check()?;

    auth.sign_in(form.email.trim(), &form.password)
        .await
        .map_err(|error| {
            tracing::error!("Sign-in failed: {}", error);
            FieldErrors::single("email", INVALID_CREDENTIALS)
        })
}

/// Validate `form`, create the account and write its `users` record.
pub async fn register<B>(backend: &B, form: &RegistrationForm) -> Result<AuthUser, FieldErrors>
where
    B: AuthProvider + DocumentStore,
{
    form.check()?;

    let email = form.email.trim();
    let user = backend
        .sign_up(email, &form.password)
        .await
        .map_err(|error| {
            tracing::error!("Registration failed: {}", error);
            FieldErrors::single("email", format!("Registration failed: {error}"))
        })?;

    let profile = UserPatch {
        name: Some(form.name.trim().to_string()),
        email: Some(email.to_string()),
        avatar_url: Some(DEFAULT_AVATAR.to_string()),
    };
    if let Err(error) = backend.merge_user(&user.id, &profile).await {
        tracing::error!("Failed to create user record for {}: {}", user.id, error);
        return Err(FieldErrors::single(
            "form",
            "Account created, but the profile could not be saved.",
        ));
    }

    tracing::info!("Registered user {}", user.id);
    Ok(user)
}

/// Sign out; failures are only logged.
pub async fn sign_out<A: AuthProvider>(auth: &A) {
    if let Err(error) = auth.sign_out().await {
        tracing::error!("Error signing out: {}", error);
    }
}
