//! HTTP layer: client construction and status mapping.
//!
//! This is the ONLY place for status code handling of the notification API.
//! client/mod.rs never interprets status codes.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ClientConfig, EnvironmentCredentials};
use crate::error::{NotifyError, NotifyResult};
use crate::types::BearerToken;

const USER_AGENT_VALUE: &str = concat!("event-notify/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client with a bounded request timeout.
pub(crate) fn build_http_client(config: &ClientConfig) -> NotifyResult<reqwest::Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(default_headers)
        .build()
        .map_err(|e| NotifyError::Network {
            message: format!("failed to create HTTP client: {}", e),
        })
}

/// API URL for `path` under the credentials' base URL.
///
/// Segments are appended to any path the base URL already carries, so a
/// base such as `http://proxy/ebay` keeps its prefix. `extra` segments are
/// percent-encoded.
pub(crate) fn api_url(
    creds: &EnvironmentCredentials,
    path: &str,
    extra: &[&str],
) -> NotifyResult<Url> {
    let base = creds.api_base();
    let mut url = Url::parse(&base).map_err(|e| NotifyError::Config {
        message: format!("invalid base URL {}: {}", base, e),
    })?;
    url.path_segments_mut()
        .map_err(|_| NotifyError::Config {
            message: format!("base URL {} cannot carry a path", base),
        })?
        .pop_if_empty()
        .extend(path.split('/').filter(|s| !s.is_empty()))
        .extend(extra);
    Ok(url)
}

/// HTTP backend for authenticated API reads.
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
}

impl HttpBackend {
    /// Single authenticated GET, decoded as JSON. No retries.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &BearerToken,
    ) -> NotifyResult<T> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("bearer {}", token.as_str()))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        match status.as_u16() {
            200..=299 => response
                .json()
                .await
                .map_err(|e| NotifyError::InvalidResponse {
                    message: format!("failed to parse response body: {}", e),
                }),

            401 | 403 => Err(NotifyError::Unauthorized {
                message: format!("HTTP {}: application token rejected", status.as_u16()),
            }),

            404 => Err(NotifyError::InvalidResponse {
                message: "public key not found".to_string(),
            }),

            _ => {
                let message = response.text().await.unwrap_or_else(|_| status.to_string());
                Err(NotifyError::Network {
                    message: format!("HTTP {}: {}", status.as_u16(), message),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&ClientConfig::default().with_timeout_secs(1));
        assert!(client.is_ok());
    }

    fn credentials(base_url: &str) -> EnvironmentCredentials {
        crate::config::Config::default()
            .with_production(
                crate::config::EnvironmentConfig::new("client", "secret").with_base_url(base_url),
            )
            .credentials(crate::config::Environment::Production)
    }

    #[test]
    fn test_api_url_keeps_base_path_prefix() {
        let url = api_url(&credentials("http://proxy/ebay/"), "/identity/v1/oauth2/token", &[])
            .unwrap();
        assert_eq!(url.as_str(), "http://proxy/ebay/identity/v1/oauth2/token");

        let url = api_url(&credentials("http://proxy/ebay"), "/a/b", &["k 1"]).unwrap();
        assert_eq!(url.as_str(), "http://proxy/ebay/a/b/k%201");
    }

    #[test]
    fn test_api_url_on_bare_origin() {
        let url = api_url(&credentials("https://api.ebay.com"), "/a/b", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.ebay.com/a/b");
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT_VALUE.starts_with("event-notify/"));
    }
}
