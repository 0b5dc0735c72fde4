//! Supabase GoTrue client: password sign-in, sign-up, refresh and logout.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::{AuthSession, AuthUser, SessionPersistence};
use crate::backend::{BackendError, BackendResult};
use crate::models::UserId;
use crate::util::{compact_text, is_http_url, unix_timestamp_now};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    /// The project requires email confirmation before the first sign-in
    ConfirmationRequired(AuthUser),
}

#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(
        client: Client,
        url: &str,
        anon_key: impl Into<String>,
        store: S,
    ) -> BackendResult<Self> {
        let auth_url = normalize_auth_url(url)?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(BackendError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            auth_url,
            anon_key,
            client,
            store,
        })
    }

    /// Load the persisted session, refreshing it when close to expiry.
    ///
    /// A session that cannot be refreshed is discarded.
    pub async fn restore_session(&self) -> BackendResult<Option<AuthSession>> {
        let Some(stored) = self.store.load_session()? else {
            return Ok(None);
        };
        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        match self.refresh_session(&stored.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome> {
        let request = self.public_request(
            self.client
                .post(format!("{}/signup", self.auth_url))
                .json(&credentials(email, password)),
        );
        let response = send_auth_request(request).await?;
        let user = response.user().cloned();

        match response.into_session()? {
            Some(session) => {
                self.store.save_session(&session)?;
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => user
                .map(|user| SignUpOutcome::ConfirmationRequired(user.into()))
                .ok_or_else(|| BackendError::Api("Sign-up response had no user".to_string())),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", "password")])
                .json(&credentials(email, password)),
        );

        let session = send_auth_request(request)
            .await
            .map_err(|error| match error {
                BackendError::Api(message) => BackendError::Auth(message),
                other => other,
            })?
            .into_session()?
            .ok_or_else(|| {
                BackendError::Auth("Sign-in response did not include a session".to_string())
            })?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> BackendResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(BackendError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }

        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", "refresh_token")])
                .json(&serde_json::json!({ "refresh_token": refresh_token })),
        );
        let session = send_auth_request(request)
            .await?
            .into_session()?
            .ok_or_else(|| {
                BackendError::Api("Refresh response did not include a session".to_string())
            })?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    /// Revoke the session remotely and forget it locally.
    ///
    /// An already-invalid token still clears the stored session.
    pub async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !(status.is_success() || status == StatusCode::UNAUTHORIZED) {
            return Err(BackendError::Api(error_text(response).await));
        }

        self.store.clear_session()
    }

    fn public_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

/// Normalize a project URL to its `/auth/v1` endpoint
pub fn normalize_auth_url(url: &str) -> BackendResult<String> {
    let base = normalize_project_url(url)?;
    if base.ends_with("/auth/v1") {
        Ok(base)
    } else {
        Ok(format!("{base}/auth/v1"))
    }
}

pub(crate) fn normalize_project_url(url: &str) -> BackendResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(BackendError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !is_http_url(trimmed) {
        return Err(BackendError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }
    Ok(trimmed.to_string())
}

fn credentials(email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": password,
    })
}

async fn send_auth_request(request: RequestBuilder) -> BackendResult<SupabaseAuthResponse> {
    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(BackendError::Api(error_text(response).await));
    }
    Ok(response.json::<SupabaseAuthResponse>().await?)
}

/// Consume a failed response into a readable message
pub(crate) async fn error_text(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    parse_api_error(status, &body)
}

#[derive(Debug, Deserialize)]
struct SupabaseAuthResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<SupabaseUser>,
}

impl SupabaseAuthResponse {
    const fn user(&self) -> Option<&SupabaseUser> {
        self.user.as_ref()
    }

    fn into_session(self) -> BackendResult<Option<AuthSession>> {
        let expires_at = self.expires_at.or_else(|| {
            self.expires_in
                .map(|expires_in| unix_timestamp_now().saturating_add(expires_in))
        });

        match (self.access_token, self.refresh_token, expires_at, self.user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user: user.into(),
                }))
            }
            (None, None, None, Some(_)) => Ok(None),
            _ => Err(BackendError::Api(
                "Auth response did not include enough session fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SupabaseUser {
    id: String,
    email: Option<String>,
}

impl From<SupabaseUser> for AuthUser {
    fn from(value: SupabaseUser) -> Self {
        Self {
            id: UserId::new(value.id),
            email: value.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

pub(crate) fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<SupabaseErrorResponse>(body) {
        if let Some(message) = payload
            .message
            .or(payload.msg)
            .or(payload.error_description)
            .or(payload.error)
        {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let body = compact_text(body);
    if body.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", body, status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_auth_url_appends_auth_path() {
        assert_eq!(
            normalize_auth_url("https://demo.supabase.co/").unwrap(),
            "https://demo.supabase.co/auth/v1"
        );
        assert_eq!(
            normalize_auth_url("https://demo.supabase.co/auth/v1").unwrap(),
            "https://demo.supabase.co/auth/v1"
        );
    }

    #[test]
    fn normalize_auth_url_requires_scheme() {
        assert!(matches!(
            normalize_auth_url("demo.supabase.co"),
            Err(BackendError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn response_without_tokens_means_confirmation_required() {
        let response: SupabaseAuthResponse =
            serde_json::from_str(r#"{ "user": { "id": "u1", "email": "a@b.co" } }"#).unwrap();
        assert!(response.into_session().unwrap().is_none());
    }

    #[test]
    fn response_with_expires_in_builds_session() {
        let response: SupabaseAuthResponse = serde_json::from_str(
            r#"{
                "access_token": "a",
                "refresh_token": "r",
                "expires_in": 3600,
                "user": { "id": "u1", "email": null }
            }"#,
        )
        .unwrap();
        let session = response.into_session().unwrap().unwrap();
        assert_eq!(session.user.id, UserId::new("u1"));
        assert!(!session.is_expired());
    }

    #[test]
    fn parse_api_error_prefers_message_fields() {
        let message = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{ "error": "invalid_grant", "error_description": "Invalid login credentials" }"#,
        );
        assert_eq!(message, "Invalid login credentials (400)");
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
    }
}
