//! Client configuration.
//!
//! `ClientConfig` carries the public Supabase project endpoint and anon key.
//! When neither is set the app runs against the in-memory backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const POLL_INTERVAL_VAR: &str = "CHATAPP_POLL_INTERVAL_MS";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1500;
const MIN_POLL_INTERVAL_MS: u64 = 250;

/// Public client settings. Secret credentials must never be stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    /// Live-query polling period for the remote backend
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

/// Which backend the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    InMemory,
    Supabase(SupabaseConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub poll_interval: Duration,
}

impl ClientConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup` (environment-shaped key/value source)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let poll_interval_ms = normalize_text_option(lookup(POLL_INTERVAL_VAR))
            .map(|raw| {
                raw.parse::<u64>().map_err(|error| {
                    Error::Config(format!("{POLL_INTERVAL_VAR} must be a whole number: {error}"))
                })
            })
            .transpose()?;

        Ok(Self {
            supabase_url: lookup(SUPABASE_URL_VAR),
            supabase_anon_key: lookup(SUPABASE_ANON_KEY_VAR),
            poll_interval_ms,
        })
    }

    /// Parse settings from a JSON payload; unknown fields are rejected
    pub fn parse(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|error| Error::Config(format!("invalid client config JSON: {error}")))
    }

    /// Decide the backend. Both Supabase values absent selects the in-memory
    /// backend; exactly one present is an error.
    pub fn backend_mode(&self) -> Result<BackendMode> {
        let url = normalize_text_option(self.supabase_url.clone());
        let anon_key = normalize_text_option(self.supabase_anon_key.clone());

        match (url, anon_key) {
            (None, None) => Ok(BackendMode::InMemory),
            (Some(url), Some(anon_key)) => {
                if !is_http_url(&url) {
                    return Err(Error::Config(format!(
                        "{SUPABASE_URL_VAR} must include http:// or https://"
                    )));
                }
                let poll_ms = self
                    .poll_interval_ms
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
                    .max(MIN_POLL_INTERVAL_MS);
                Ok(BackendMode::Supabase(SupabaseConfig {
                    url: url.trim_end_matches('/').to_string(),
                    anon_key,
                    poll_interval: Duration::from_millis(poll_ms),
                }))
            }
            (Some(_), None) => Err(Error::Config(format!(
                "{SUPABASE_ANON_KEY_VAR} is required when {SUPABASE_URL_VAR} is set"
            ))),
            (None, Some(_)) => Err(Error::Config(format!(
                "{SUPABASE_URL_VAR} is required when {SUPABASE_ANON_KEY_VAR} is set"
            ))),
        }
    }
}
