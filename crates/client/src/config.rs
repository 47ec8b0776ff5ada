//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREROOM_API_URL` - Base URL of the ERP API (default: `http://localhost:8000/`)
//! - `STOREROOM_API_TOKEN` - Bearer token sent with every request
//! - `STOREROOM_FETCH_PAGE_SIZE` - Page size used when fetching full result sets
//!   (default: 100, range 1-1000)
//! - `STOREROOM_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `STOREROOM_CACHE_TTL_SECS` - How long list responses stay fresh
//!   (default: 0, caching disabled)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8000/";
const DEFAULT_FETCH_PAGE_SIZE: u32 = 100;
const MAX_FETCH_PAGE_SIZE: u32 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Inventory API client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// API base URL, always ending in `/`
    pub base_url: Url,
    /// Bearer token, if the API requires one
    pub api_token: Option<SecretString>,
    /// Page size for the full-scan fetch loop
    pub fetch_page_size: u32,
    /// Per-request timeout
    pub timeout: Duration,
    /// Response cache lifetime; zero disables the cache
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("fetch_page_size", &self.fetch_page_size)
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration for `base_url` with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("STOREROOM_API_URL", base_url)?,
            api_token: None,
            fetch_page_size: DEFAULT_FETCH_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::ZERO,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_env_or_default(&lookup, "STOREROOM_API_URL", DEFAULT_API_URL);
        let base_url = parse_base_url("STOREROOM_API_URL", &base_url)?;

        let api_token = get_optional_env(&lookup, "STOREROOM_API_TOKEN").map(SecretString::from);

        let fetch_page_size = get_env_or_default(
            &lookup,
            "STOREROOM_FETCH_PAGE_SIZE",
            &DEFAULT_FETCH_PAGE_SIZE.to_string(),
        )
        .parse::<u32>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("STOREROOM_FETCH_PAGE_SIZE".to_string(), e.to_string())
        })?;
        if !(1..=MAX_FETCH_PAGE_SIZE).contains(&fetch_page_size) {
            return Err(ConfigError::InvalidEnvVar(
                "STOREROOM_FETCH_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_FETCH_PAGE_SIZE}"),
            ));
        }

        let timeout = get_seconds(&lookup, "STOREROOM_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "STOREROOM_HTTP_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let cache_ttl = get_seconds(&lookup, "STOREROOM_CACHE_TTL_SECS", 0)?;

        Ok(Self {
            base_url,
            api_token,
            fetch_page_size,
            timeout,
            cache_ttl,
        })
    }

    /// Whether list responses are cached.
    #[must_use]
    pub const fn cache_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating an empty value as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

fn get_seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    get_env_or_default(lookup, key, &default.to_string())
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the API base URL, appending a trailing `/` so relative endpoint
/// paths resolve beneath it.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected an http(s) URL, got {raw}"),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert!(config.api_token.is_none());
        assert_eq!(config.fetch_page_size, 100);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.cache_enabled());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("STOREROOM_API_URL", "https://erp.example.com/api")]))
                .unwrap();
        assert_eq!(config.base_url.as_str(), "https://erp.example.com/api/");
    }

    #[test]
    fn test_rejects_non_http_url() {
        let result = ClientConfig::from_lookup(lookup_from(&[("STOREROOM_API_URL", "mailto:ops@example.com")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_page_size_bounds() {
        let zero = ClientConfig::from_lookup(lookup_from(&[("STOREROOM_FETCH_PAGE_SIZE", "0")]));
        assert!(zero.is_err());

        let huge = ClientConfig::from_lookup(lookup_from(&[("STOREROOM_FETCH_PAGE_SIZE", "5000")]));
        assert!(huge.is_err());

        let ok = ClientConfig::from_lookup(lookup_from(&[("STOREROOM_FETCH_PAGE_SIZE", "250")])).unwrap();
        assert_eq!(ok.fetch_page_size, 250);
    }

    #[test]
    fn test_invalid_number() {
        let result = ClientConfig::from_lookup(lookup_from(&[("STOREROOM_CACHE_TTL_SECS", "soon")]));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("STOREROOM_CACHE_TTL_SECS"));
    }

    #[test]
    fn test_empty_token_is_unset() {
        let config = ClientConfig::from_lookup(lookup_from(&[("STOREROOM_API_TOKEN", "  ")])).unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("STOREROOM_API_TOKEN", "tok_live_8f2k")])).unwrap();
        assert_eq!(config.api_token.as_ref().unwrap().expose_secret(), "tok_live_8f2k");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tok_live_8f2k"));
    }

    #[test]
    fn test_cache_ttl() {
        let config = ClientConfig::from_lookup(lookup_from(&[("STOREROOM_CACHE_TTL_SECS", "60")])).unwrap();
        assert!(config.cache_enabled());
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }
}
