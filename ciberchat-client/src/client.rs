//! Chat API client struct and builder.

use std::time::Duration;

use ciberchat_stream::{AssemblerConfig, StreamAssembler};
use ciberchat_types::ClientError;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{map_http_status, map_reqwest_error};

/// Client for the chat REST API and its streamed send endpoint.
///
/// # Example
///
/// ```no_run
/// use ciberchat_client::ChatClient;
///
/// let client = ChatClient::new("http://localhost:8000")
///     .session_cookie("sessionid=abc; csrftoken=xyz")
///     .csrf_token("xyz");
/// ```
#[derive(Debug, Clone)]
pub struct ChatClient {
    /// API base URL, without the `/api` prefix.
    pub(crate) base_url: String,
    /// Forwarded as the `Cookie` header.
    pub(crate) session_cookie: Option<String>,
    /// Forwarded as the `X-CSRFToken` header.
    pub(crate) csrf_token: Option<String>,
    /// Timeout for REST calls.
    pub(crate) timeout: Option<Duration>,
    /// Assembler driving streamed sends.
    pub(crate) assembler: StreamAssembler,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl ChatClient {
    /// Create a client for the API at `base_url` with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        })
    }

    /// Create a client from a full configuration.
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url,
            session_cookie: config.session_cookie,
            csrf_token: config.csrf_token,
            timeout: config.timeout,
            assembler: StreamAssembler::new(config.assembler),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client configured from `CIBERCHAT_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_config(ClientConfig::from_env())
    }

    /// Set the `Cookie` header carrying the session.
    #[must_use]
    pub fn session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Set the `X-CSRFToken` header required on writes.
    #[must_use]
    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Override the REST call timeout. `None` disables it.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the stream assembler settings.
    #[must_use]
    pub fn assembler_config(mut self, config: AssemblerConfig) -> Self {
        self.assembler = StreamAssembler::new(config);
        self
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, cookie store).
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL of an API path such as `/chats/`.
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url.trim_end_matches('/'))
    }

    /// Start a request carrying the session headers.
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(cookie) = &self.session_cookie {
            builder = builder.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(token) = &self.csrf_token {
            builder = builder.header("X-CSRFToken", token);
        }
        builder
    }

    /// Send a REST request and return the body of a successful response.
    async fn execute(&self, builder: RequestBuilder) -> Result<String, ClientError> {
        let builder = match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        if !status.is_success() {
            return Err(map_http_status(status, &body));
        }
        Ok(body)
    }

    /// Send a REST request and decode its JSON body.
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let body = self.execute(builder).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Send a REST request, discarding the body.
    pub(crate) async fn execute_empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        self.execute(builder).await.map(drop)
    }
}
