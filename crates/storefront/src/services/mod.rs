//! Clients for the remote identity and object-storage services.
//!
//! Both services sit behind the same REST gateway and authenticate with the
//! privileged service key, sent as `apikey` and as a bearer token. Each client
//! is exposed through an object-safe trait so handlers can be driven by the
//! in-memory backends in [`crate::testing`].

pub mod identity;
pub mod storage;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::RemoteConfig;

pub use identity::{IdentityClient, IdentityError, IdentityProvider, IdentityUser};
pub use storage::{ObjectStorage, StorageClient, StorageError};

/// Request timeout applied to every remote call.
pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Default headers carrying the service key.
fn service_headers(config: &RemoteConfig) -> Result<HeaderMap, InvalidHeaderValue> {
    let key = config.service_key.expose_secret();

    let mut api_key = HeaderValue::from_str(key)?;
    api_key.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", api_key);
    headers.insert(AUTHORIZATION, bearer);
    Ok(headers)
}

/// Build the shared HTTP client for a remote service.
fn build_http_client(headers: HeaderMap) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Join `path` onto the gateway base URL.
fn endpoint(config: &RemoteConfig, path: &str) -> String {
    format!(
        "{}/{}",
        config.base_url.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Error bodies use several field names depending on the service.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Pull a human-readable message out of an error response body.
fn error_message(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .msg
        .or(parsed.message)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| body.trim().to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use url::Url;

    use super::*;

    fn config(base: &str) -> RemoteConfig {
        RemoteConfig {
            base_url: Url::parse(base).unwrap(),
            service_key: SecretString::from("service-key-value"),
        }
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint(&config("https://api.example.com/"), "/auth/v1/user"),
            "https://api.example.com/auth/v1/user"
        );
        assert_eq!(
            endpoint(&config("https://api.example.com/gw"), "storage/v1/object/b"),
            "https://api.example.com/gw/storage/v1/object/b"
        );
    }

    #[test]
    fn test_service_headers_carry_key_twice() {
        let headers = service_headers(&config("https://api.example.com")).unwrap();
        assert_eq!(headers.get("apikey").unwrap(), "service-key-value");
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap(),
            "Bearer service-key-value"
        );
        assert!(headers.get("apikey").unwrap().is_sensitive());
    }

    #[test]
    fn test_error_message_prefers_known_fields() {
        assert_eq!(
            error_message(r#"{"msg":"A user with this email address has already been registered"}"#),
            "A user with this email address has already been registered"
        );
        assert_eq!(
            error_message(r#"{"statusCode":"404","error":"not_found","message":"Bucket not found"}"#),
            "Bucket not found"
        );
        assert_eq!(error_message("  bad gateway \n"), "bad gateway");
    }
}
