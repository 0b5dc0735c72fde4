//! Supabase backend: GoTrue auth plus PostgREST tables `users` and `chats`.
//!
//! PostgREST has no push channel we can rely on from a desktop client, so
//! live watches poll their query and forward a snapshot only when the result
//! differs from the previous one.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::{
    AuthProvider, BackendError, BackendResult, ChatQuery, ChatUpdate, DocumentStore, Subscribers,
    Subscription,
};
use crate::auth::supabase::{error_text, normalize_project_url};
use crate::auth::{AuthSession, AuthUser, SessionPersistence, SignUpOutcome, SupabaseAuthClient};
use crate::config::SupabaseConfig;
use crate::models::{ChatId, ChatRecord, NewChat, UserId, UserPatch, UserProfile};

#[derive(Clone)]
pub struct SupabaseBackend<S: SessionPersistence> {
    inner: Arc<Remote<S>>,
}

struct Remote<S: SessionPersistence> {
    rest_url: String,
    anon_key: String,
    client: Client,
    auth: SupabaseAuthClient<S>,
    session: Mutex<Option<AuthSession>>,
    auth_watchers: Subscribers<(), Option<AuthUser>>,
    poll_interval: Duration,
}

impl<S: SessionPersistence> SupabaseBackend<S> {
    pub fn new(config: &SupabaseConfig, store: S) -> BackendResult<Self> {
        let base_url = normalize_project_url(&config.url)?;
        let client = Client::builder().build()?;
        let auth = SupabaseAuthClient::new(client.clone(), &base_url, &*config.anon_key, store)?;

        Ok(Self {
            inner: Arc::new(Remote {
                rest_url: format!("{base_url}/rest/v1"),
                anon_key: config.anon_key.trim().to_string(),
                client,
                auth,
                session: Mutex::new(None),
                auth_watchers: Subscribers::default(),
                poll_interval: config.poll_interval,
            }),
        })
    }

    /// Restore the persisted session, if any, and announce it to auth watchers
    pub async fn restore_session(&self) -> BackendResult<Option<AuthUser>> {
        let session = self.inner.auth.restore_session().await?;
        let user = session.as_ref().map(|session| session.user.clone());
        self.inner.set_session(session);
        Ok(user)
    }

    /// Spawn a polling task feeding a [`Subscription`]; cancelling aborts it.
    fn poll<T, F, Fut>(&self, label: &'static str, fetch: F) -> Subscription<T>
    where
        T: Clone + PartialEq + Send + 'static,
        F: Fn(Arc<Remote<S>>) -> Fut + Send + 'static,
        Fut: Future<Output = BackendResult<T>> + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let remote = Arc::clone(&self.inner);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(remote.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<T> = None;

            loop {
                ticker.tick().await;
                match fetch(Arc::clone(&remote)).await {
                    Ok(snapshot) if last.as_ref() != Some(&snapshot) => {
                        if sender.send(snapshot.clone()).is_err() {
                            break;
                        }
                        last = Some(snapshot);
                    }
                    Ok(_) => {}
                    Err(error) => tracing::warn!("Polling {} failed: {}", label, error),
                }
            }
        });

        Subscription::new(receiver, move || task.abort())
    }
}

impl<S: SessionPersistence> Remote<S> {
    fn session(&self) -> MutexGuard<'_, Option<AuthSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_session(&self, session: Option<AuthSession>) {
        let user = session.as_ref().map(|session| session.user.clone());
        *self.session() = session;
        self.auth_watchers.publish(|()| user.clone());
    }

    /// Access token of the signed-in user, refreshed when close to expiry
    async fn access_token(&self) -> BackendResult<String> {
        let current = self.session().clone().ok_or(BackendError::NotSignedIn)?;
        if !current.is_expired() {
            return Ok(current.access_token);
        }

        let refreshed = self.auth.refresh_session(&current.refresh_token).await?;
        let token = refreshed.access_token.clone();
        *self.session() = Some(refreshed);
        Ok(token)
    }

    async fn request(&self, method: Method, path: &str) -> BackendResult<RequestBuilder> {
        let token = self.access_token().await?;
        Ok(self
            .client
            .request(method, format!("{}/{path}", self.rest_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token))
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<Vec<T>> {
        let response = ensure_success(request.send().await?).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    async fn fetch_user(&self, id: &UserId) -> BackendResult<Option<UserProfile>> {
        let filter = format!("eq.{id}");
        let request = self
            .request(Method::GET, "users")
            .await?
            .query(&[("select", "*"), ("id", filter.as_str())]);
        let mut rows: Vec<UserProfile> = self.fetch_rows(request).await?;
        Ok(rows.pop())
    }

    async fn fetch_users(&self) -> BackendResult<Vec<UserProfile>> {
        let request = self
            .request(Method::GET, "users")
            .await?
            .query(&[("select", "*"), ("order", "name.asc")]);
        self.fetch_rows(request).await
    }

    async fn fetch_chats(&self, query: &ChatQuery) -> BackendResult<Vec<ChatRecord>> {
        let mut request = self.request(Method::GET, "chats").await?.query(&[
            ("select", "*".to_string()),
            ("users", format!("cs.{{{}}}", query.participant)),
        ]);
        if query.newest_first {
            request = request.query(&[("order", "last_message_timestamp.desc.nullslast")]);
        }
        if let Some(limit) = query.limit {
            request = request.query(&[("limit", limit)]);
        }
        self.fetch_rows(request).await
    }
}

async fn ensure_success(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_text(response).await;
    if status == StatusCode::NOT_FOUND {
        Err(BackendError::NotFound(message))
    } else if status == StatusCode::UNAUTHORIZED {
        Err(BackendError::Auth(message))
    } else {
        Err(BackendError::Api(message))
    }
}

impl<S: SessionPersistence> AuthProvider for SupabaseBackend<S> {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        let session = self.inner.auth.sign_in(email, password).await?;
        let user = session.user.clone();
        self.inner.set_session(Some(session));
        tracing::info!("Signed in {}", user.id);
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        match self.inner.auth.sign_up(email, password).await? {
            SignUpOutcome::SignedIn(session) => {
                let user = session.user.clone();
                self.inner.set_session(Some(session));
                Ok(user)
            }
            SignUpOutcome::ConfirmationRequired(user) => {
                tracing::info!("Account {} awaits email confirmation", user.id);
                Err(BackendError::Auth(
                    "confirm your email address, then sign in".to_string(),
                ))
            }
        }
    }

    async fn sign_out(&self) -> BackendResult<()> {
        let token = self.inner.session().as_ref().map(|s| s.access_token.clone());
        let result = match token {
            Some(token) => self.inner.auth.sign_out(&token).await,
            None => Ok(()),
        };
        self.inner.set_session(None);
        result
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.inner.session().as_ref().map(|session| session.user.clone())
    }

    fn watch_auth(&self) -> Subscription<Option<AuthUser>> {
        let current = self.current_user();
        self.inner.auth_watchers.subscribe((), current)
    }
}

impl<S: SessionPersistence> DocumentStore for SupabaseBackend<S> {
    async fn get_user(&self, id: &UserId) -> BackendResult<Option<UserProfile>> {
        self.inner.fetch_user(id).await
    }

    async fn list_users(&self) -> BackendResult<Vec<UserProfile>> {
        self.inner.fetch_users().await
    }

    async fn merge_user(&self, id: &UserId, patch: &UserPatch) -> BackendResult<()> {
        let mut row = serde_json::to_value(patch)?;
        if let Some(fields) = row.as_object_mut() {
            fields.insert("id".to_string(), serde_json::Value::String(id.to_string()));
        }

        let request = self
            .inner
            .request(Method::POST, "users")
            .await?
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row);
        ensure_success(request.send().await?).await?;
        Ok(())
    }

    fn watch_user(&self, id: &UserId) -> Subscription<Option<UserProfile>> {
        let id = id.clone();
        self.poll("user record", move |remote| {
            let id = id.clone();
            async move { remote.fetch_user(&id).await }
        })
    }

    async fn query_chats(&self, query: &ChatQuery) -> BackendResult<Vec<ChatRecord>> {
        self.inner.fetch_chats(query).await
    }

    fn watch_chats(&self, query: &ChatQuery) -> Subscription<Vec<ChatRecord>> {
        let query = query.clone();
        self.poll("chat list", move |remote| {
            let query = query.clone();
            async move { remote.fetch_chats(&query).await }
        })
    }

    async fn create_chat(&self, chat: &NewChat) -> BackendResult<ChatId> {
        let request = self
            .inner
            .request(Method::POST, "chats")
            .await?
            .header("Prefer", "return=representation")
            .json(chat);
        let mut created: Vec<ChatRecord> = self.inner.fetch_rows(request).await?;
        created
            .pop()
            .map(|chat| chat.id)
            .ok_or_else(|| BackendError::Api("Insert returned no chat row".to_string()))
    }

    async fn update_chat(&self, id: &ChatId, update: &ChatUpdate) -> BackendResult<()> {
        let (reader, read_at) = update
            .last_read
            .as_ref()
            .map_or((None, None), |(reader, at)| (Some(reader), Some(*at)));
        let payload = serde_json::json!({
            "chat_id": id,
            "message": update.append_message,
            "last_message_at": update.last_message_timestamp,
            "reader": reader,
            "read_at": read_at,
        });

        let request = self
            .inner
            .request(Method::POST, "rpc/apply_chat_update")
            .await?
            .json(&payload);
        ensure_success(request.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::auth::MemorySessionStore;

    async fn spawn_one_shot_server(status_line: &str, body: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let address = listener.local_addr().expect("local address");
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len(),
        );

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request_buffer = [0_u8; 4096];
                let _ = socket.read(&mut request_buffer).await;
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{address}")
    }

    fn config(url: &str) -> SupabaseConfig {
        SupabaseConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
            poll_interval: Duration::from_millis(50),
        }
    }

    #[test]
    fn new_rejects_blank_anon_key() {
        let mut config = config("https://demo.supabase.co");
        config.anon_key = "  ".to_string();
        assert!(matches!(
            SupabaseBackend::new(&config, MemorySessionStore::default()),
            Err(BackendError::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn document_reads_require_a_session() {
        let backend =
            SupabaseBackend::new(&config("https://demo.supabase.co"), MemorySessionStore::default())
                .unwrap();
        assert!(backend.current_user().is_none());
        assert!(matches!(
            backend.list_users().await,
            Err(BackendError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn sign_in_stores_session_and_notifies_watchers() {
        let body = r#"{
            "access_token": "access",
            "refresh_token": "refresh",
            "expires_in": 3600,
            "user": { "id": "u1", "email": "alice@example.com" }
        }"#;
        let url = spawn_one_shot_server("200 OK", body).await;
        let store = MemorySessionStore::default();
        let backend = SupabaseBackend::new(&config(&url), store.clone()).unwrap();
        let mut auth = backend.watch_auth();
        assert_eq!(auth.next().await, Some(None));

        let user = backend.sign_in("alice@example.com", "secret1").await.unwrap();

        assert_eq!(user.id, UserId::new("u1"));
        assert_eq!(auth.next().await, Some(Some(user.clone())));
        assert_eq!(
            store.load_session().unwrap().map(|session| session.user),
            Some(user)
        );
    }

    #[tokio::test]
    async fn rejected_sign_in_is_an_auth_error() {
        let url = spawn_one_shot_server(
            "400 Bad Request",
            r#"{ "error": "invalid_grant", "error_description": "Invalid login credentials" }"#,
        )
        .await;
        let backend = SupabaseBackend::new(&config(&url), MemorySessionStore::default()).unwrap();

        let error = backend.sign_in("alice@example.com", "nope").await.unwrap_err();
        assert!(matches!(error, BackendError::Auth(_)));
        assert!(backend.current_user().is_none());
    }
}
