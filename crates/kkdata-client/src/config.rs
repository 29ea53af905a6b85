//! Client configuration.

use std::fmt;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Environment variable holding the service base URL.
pub const ENDPOINT_ENV: &str = "KKDATA_ENDPOINT";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "KKDATA_API_KEY";

/// Connection settings for [`KkDataClient`](crate::KkDataClient).
///
/// Settings are captured when the client is built and never change afterward.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl ClientConfig {
    /// Create a free-tier configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Read the configuration from `KKDATA_ENDPOINT` and `KKDATA_API_KEY`.
    ///
    /// Unset or empty variables fall back to the default endpoint and the free
    /// tier respectively.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let config = present(ENDPOINT_ENV).map_or_else(Self::default, Self::new);
        match present(API_KEY_ENV) {
            Some(key) => config.with_api_key(key),
            None => config,
        }
    }

    /// Replace the base URL.
    #[must_use]
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            api_key: self.api_key,
            ..Self::new(base_url)
        }
    }

    /// Set the API key, switching the client to the authenticated endpoints.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set an optional API key.
    #[must_use]
    pub fn with_optional_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured API key, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_is_free_tier() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), DEFAULT_ENDPOINT);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ClientConfig::new("https://data.example.com/");
        assert_eq!(config.base_url(), "https://data.example.com");
    }

    #[test]
    fn test_with_base_url_keeps_api_key() {
        let config = ClientConfig::default()
            .with_api_key("secret")
            .with_base_url("https://data.example.com/");
        assert_eq!(config.base_url(), "https://data.example.com");
        assert_eq!(config.api_key(), Some("secret"));
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENDPOINT_ENV, "https://data.example.com"),
            (API_KEY_ENV, "secret"),
        ]));
        assert_eq!(config.base_url(), "https://data.example.com");
        assert_eq!(config.api_key(), Some("secret"));
    }

    #[test]
    fn test_from_lookup_ignores_empty_values() {
        let config = ClientConfig::from_lookup(lookup(&[(API_KEY_ENV, "  ")]));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::default().with_api_key("secret_key_12345");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
