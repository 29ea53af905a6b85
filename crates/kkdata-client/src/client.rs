//! HTTP transport for the kkdata service.

use std::fmt;

use async_trait::async_trait;
use kkdata_core::{KkDataError, QueryExecutor, Result, codec};
use polars::prelude::DataFrame;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;

/// Which endpoints a client talks to. Fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// No API key: restricted `/sql-free/` endpoint, no credential header.
    Free,
    /// API key present: full `/sql/` endpoint with the `api-key` header.
    Authenticated,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => f.write_str("free"),
            Self::Authenticated => f.write_str("authenticated"),
        }
    }
}

/// Client for the kkdata service.
///
/// Cheap to clone; clones share the underlying connection pool. The client
/// holds no mutable state, so one instance can serve many concurrent tasks.
#[derive(Clone)]
pub struct KkDataClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for KkDataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KkDataClient")
            .field("base_url", &self.base_url)
            .field("mode", &self.mode())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for KkDataClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl KkDataClient {
    /// Create a new client from a configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a new client with a custom HTTP client.
    ///
    /// Use this to set timeouts, proxies or TLS options.
    #[must_use]
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url().to_string(),
            api_key: config.api_key().map(str::to_string),
        }
    }

    /// Create a client configured from the environment.
    ///
    /// See [`ClientConfig::from_env`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    /// The endpoint set this client uses.
    #[must_use]
    pub const fn mode(&self) -> AccessMode {
        match self.api_key {
            Some(_) => AccessMode::Authenticated,
            None => AccessMode::Free,
        }
    }

    /// Base URL of the service.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an absolute URL for a service path.
    pub(crate) fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let base = format!("{}/{path}", self.base_url);
        let mut url = Url::parse(&base)
            .map_err(|e| KkDataError::InvalidParameter(format!("Invalid URL {base}: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Build the query URL for the current access mode.
    fn query_url(&self, query: &str) -> Result<Url> {
        let path = match self.mode() {
            AccessMode::Free => "sql-free/",
            AccessMode::Authenticated => "sql/",
        };
        self.url(path, &[("query", query.to_string())])
    }

    /// Attach the credential headers when authenticated.
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("api-key", key)
                .header(reqwest::header::ACCEPT, "application/json"),
            None => request,
        }
    }

    /// Send a request, mapping any status other than 200 to
    /// [`KkDataError::Remote`].
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| KkDataError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .map_err(|e| KkDataError::Network(e.to_string()))?;
            return Err(KkDataError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Send a request and parse the JSON response.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let text = self
            .send(request)
            .await?
            .text()
            .await
            .map_err(|e| KkDataError::Network(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| KkDataError::Parse(e.to_string()))
    }

    /// Send a SQL query and return the result table.
    ///
    /// Without an API key the query goes to the free endpoint and a
    /// `MissingCredentialWarning` event is logged; this is not an error.
    pub async fn run_query(&self, query: &str) -> Result<DataFrame> {
        if self.mode() == AccessMode::Free {
            warn!(
                warning = "MissingCredentialWarning",
                "API key is not set. Using the free endpoint; some features may not be available"
            );
        }

        let url = self.query_url(query)?;
        debug!(mode = %self.mode(), path = url.path(), "kkdata query");

        let envelope: QueryEnvelope = self
            .send_json(self.authorize(self.client.post(url)))
            .await?;

        codec::decode(&envelope.data)
    }

    /// Exchange a username and password for an API key.
    pub async fn fetch_credential(&self, username: &str, password: &str) -> Result<String> {
        let url = self.url("login/", &[])?;
        debug!(username, "kkdata login");

        let response: LoginResponse = self
            .send_json(self.client.post(url).json(&Credentials { username, password }))
            .await?;
        Ok(response.access_token)
    }

    /// Register a new user and return the service's confirmation message.
    pub async fn register(&self, username: &str, password: &str) -> Result<String> {
        let url = self.url("register/", &[])?;
        debug!(username, "kkdata register");

        let response: RegisterResponse = self
            .send_json(self.client.post(url).json(&Credentials { username, password }))
            .await?;
        Ok(response.message)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl QueryExecutor for KkDataClient {
    async fn run_query(&self, query: &str) -> Result<DataFrame> {
        Self::run_query(self, query).await
    }
}

// ============================================================================
// kkdata API Request/Response Types
// ============================================================================

/// Query endpoint response; `data` holds the hex wire payload.
#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    data: String,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    message: String,
}
