//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `MAGENTO_GRAPHQL_URL` - Catalog GraphQL endpoint (default: <https://backend.reachdigital.dev/graphql>)
//! - `MAGENTO_MEDIA_URL` - Product media base URL (default: <https://backend.reachdigital.dev/media/catalog/product>)
//! - `MAGENTO_STORE_CODE` - Store view code, sent as the `Store` header
//! - `MAGENTO_ACCESS_TOKEN` - Bearer token for the catalog API
//! - `CATALOG_CACHE_TTL_SECS` - Catalog response cache TTL (default: 300)
//! - `CATALOG_REQUEST_TIMEOUT_SECS` - Catalog request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_GRAPHQL_URL: &str = "https://backend.reachdigital.dev/graphql";
const DEFAULT_MEDIA_URL: &str = "https://backend.reachdigital.dev/media/catalog/product";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Catalog API configuration
    pub magento: MagentoConfig,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Magento catalog API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct MagentoConfig {
    /// GraphQL endpoint
    pub graphql_url: Url,
    /// Base URL that media gallery file paths are appended to
    pub media_base_url: String,
    /// Store view code
    pub store_code: Option<String>,
    /// Bearer token (server-side only)
    pub access_token: Option<SecretString>,
    /// How long catalog responses stay cached
    pub cache_ttl: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl std::fmt::Debug for MagentoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagentoConfig")
            .field("graphql_url", &self.graphql_url.as_str())
            .field("media_base_url", &self.media_base_url)
            .field("store_code", &self.store_code)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_ttl", &self.cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Sentry configuration. Error tracking is off without a DSN.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set to a value
    /// that does not parse (address, port, URL, number).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("STOREFRONT_PORT", "3000")?;
        let base_url = get_url_env("STOREFRONT_BASE_URL", "http://localhost:3000")?;

        Ok(Self {
            host,
            port,
            base_url,
            magento: MagentoConfig::from_env()?,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl MagentoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let cache_ttl_secs: u64 = parse_env_or_default("CATALOG_CACHE_TTL_SECS", "300")?;
        let timeout_secs: u64 = parse_env_or_default("CATALOG_REQUEST_TIMEOUT_SECS", "10")?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            graphql_url: get_url_env("MAGENTO_GRAPHQL_URL", DEFAULT_GRAPHQL_URL)?,
            media_base_url: get_url_env("MAGENTO_MEDIA_URL", DEFAULT_MEDIA_URL)?
                .as_str()
                .trim_end_matches('/')
                .to_string(),
            store_code: get_optional_env("MAGENTO_STORE_CODE"),
            access_token: get_optional_env("MAGENTO_ACCESS_TOKEN").map(SecretString::from),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an absolute http(s) URL.
fn get_url_env(key: &str, default: &str) -> Result<Url, ConfigError> {
    validate_url(key, &get_env_or_default(key, default))
}

fn validate_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url: Url = parse_value(key, value)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a sample rate in `0.0..=1.0`.
fn parse_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env_or_default(key, default)?;
    validate_rate(key, rate)
}

fn validate_rate(key: &str, rate: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}
