//! Client configuration.

use std::time::Duration;

use ciberchat_stream::AssemblerConfig;

/// Environment variable holding the API base URL.
pub const ENV_BASE_URL: &str = "CIBERCHAT_BASE_URL";
/// Environment variable holding the session cookie (`sessionid=...; csrftoken=...`).
pub const ENV_SESSION_COOKIE: &str = "CIBERCHAT_SESSION_COOKIE";
/// Environment variable holding the CSRF token sent as `X-CSRFToken`.
pub const ENV_CSRF_TOKEN: &str = "CIBERCHAT_CSRF_TOKEN";

/// Default API base URL, matching a local development server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Static configuration for a [`ChatClient`](crate::ChatClient).
///
/// Session values are opaque: the client forwards them and never
/// interprets them.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without the `/api` prefix.
    pub base_url: String,

    /// Value of the `Cookie` header.
    pub session_cookie: Option<String>,

    /// Value of the `X-CSRFToken` header.
    pub csrf_token: Option<String>,

    /// Per-request timeout for REST calls. Streamed sends are bounded by
    /// their cancellation token instead.
    pub timeout: Option<Duration>,

    /// Settings for the stream assembler used by sends.
    pub assembler: AssemblerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            session_cookie: None,
            csrf_token: None,
            timeout: Some(Duration::from_secs(30)),
            assembler: AssemblerConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Read the base URL and session values from the environment, keeping
    /// defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = url;
        }
        config.session_cookie = std::env::var(ENV_SESSION_COOKIE).ok();
        config.csrf_token = std::env::var(ENV_CSRF_TOKEN).ok();
        config
    }
}
