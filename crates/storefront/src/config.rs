//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `REMOTE_API_URL` - Base URL of the hosted identity and storage services
//! - `REMOTE_SERVICE_KEY` - Privileged service credential for those services
//! - `ADMIN_SETUP_KEY` - Shared secret required by the `add-admin` function
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `VIDEO_BUCKET` - Storage bucket for product videos (default: product-videos)
//! - `PRODUCT_IMAGE_MAP_PATH` - YAML file overriding the built-in product image map
//! - `LOG_FORMAT` - `json` for JSON log lines (default: human-readable)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SETUP_KEY_LENGTH: usize = 16;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Default bucket for uploaded product videos.
pub const DEFAULT_VIDEO_BUCKET: &str = "product-videos";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Hosted identity/storage services
    pub remote: RemoteConfig,
    /// Shared secret for admin provisioning
    pub admin_setup_key: SecretString,
    /// Bucket receiving product videos
    pub video_bucket: String,
    /// Optional YAML override for the product image map
    pub product_image_map_path: Option<PathBuf>,
    /// Log line format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error event sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Hosted identity and storage service configuration.
///
/// Implements `Debug` manually to redact the service key.
#[derive(Clone)]
pub struct RemoteConfig {
    /// Base URL, e.g. `https://project.example-cloud.co`
    pub base_url: Url,
    /// Privileged service credential
    pub service_key: SecretString,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url.as_str())
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the setup key fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;

        let remote = RemoteConfig::from_env()?;
        let admin_setup_key = get_validated_secret("ADMIN_SETUP_KEY")?;

        let log_format = match get_optional_env("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected 'json' or 'pretty', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            database_url,
            host,
            port,
            remote,
            admin_setup_key,
            video_bucket: get_env_or_default("VIDEO_BUCKET", DEFAULT_VIDEO_BUCKET),
            product_image_map_path: get_optional_env("PRODUCT_IMAGE_MAP_PATH").map(PathBuf::from),
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RemoteConfig {
    /// Load the remote service settings on their own (the CLI needs these
    /// without the HTTP server settings).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is missing or the URL is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("REMOTE_API_URL")?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("REMOTE_API_URL".to_string(), e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "REMOTE_API_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            service_key: get_required_secret("REMOTE_SERVICE_KEY")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` naming `primary_key` if neither is set.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a sample rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is long enough, not a placeholder, and has
/// sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SETUP_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_SETUP_KEY_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Compare a caller-supplied setup key against the configured one.
#[must_use]
pub fn setup_key_matches(configured: &SecretString, provided: &str) -> bool {
    let expected = configured.expose_secret().as_bytes();
    let provided = provided.as_bytes();
    // Length is not secret; content is compared without early exit.
    expected.len() == provided.len()
        && expected
            .iter()
            .zip(provided)
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_too_short() {
        let result = validate_secret_strength("aB3$xY9!", "ADMIN_SETUP_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_placeholder() {
        let result = validate_secret_strength("your-setup-key-goes-here", "ADMIN_SETUP_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "ADMIN_SETUP_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "ADMIN_SETUP_KEY");
        assert!(result.is_ok());
    }

    #[test]
    fn test_setup_key_matches() {
        let configured = SecretString::from("k7Qp2vXz9LmN4rT8");
        assert!(setup_key_matches(&configured, "k7Qp2vXz9LmN4rT8"));
        assert!(!setup_key_matches(&configured, "k7Qp2vXz9LmN4rT9"));
        assert!(!setup_key_matches(&configured, "k7Qp2vXz9LmN4rT"));
        assert!(!setup_key_matches(&configured, ""));
    }

    #[test]
    fn test_remote_config_debug_redacts_key() {
        let config = RemoteConfig {
            base_url: Url::parse("https://project.example-cloud.co").unwrap(),
            service_key: SecretString::from("super_secret_service_key"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("project.example-cloud.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_key"));
    }
}
