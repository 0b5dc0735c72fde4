//! Desktop session persistence using the OS keyring.

use chatapp_core::auth::{AuthSession, SessionPersistence};
use chatapp_core::backend::{BackendError, BackendResult};
use keyring::Entry;

const KEYRING_SERVICE_NAME: &str = "chatapp";
const KEYRING_SESSION_USERNAME: &str = "supabase_session";

/// Session store backed by the OS keyring (`keyring` crate).
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service_name: String,
    username: String,
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self {
            service_name: KEYRING_SERVICE_NAME.to_string(),
            username: KEYRING_SESSION_USERNAME.to_string(),
        }
    }
}

impl KeyringSessionStore {
    fn entry(&self) -> BackendResult<Entry> {
        Entry::new(&self.service_name, &self.username).map_err(secure_storage)
    }
}

fn secure_storage(error: keyring::Error) -> BackendError {
    BackendError::SecureStorage(error.to_string())
}

impl SessionPersistence for KeyringSessionStore {
    fn load_session(&self) -> BackendResult<Option<AuthSession>> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(secure_storage(error)),
        }
    }

    fn save_session(&self, session: &AuthSession) -> BackendResult<()> {
        let serialized = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&serialized)
            .map_err(secure_storage)
    }

    fn clear_session(&self) -> BackendResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(secure_storage(error)),
        }
    }
}
