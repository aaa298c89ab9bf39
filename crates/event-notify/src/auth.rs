//! OAuth application tokens for the notification API.
//!
//! The public key endpoint requires an application access token obtained
//! with the client-credentials grant:
//!
//! ```text
//! POST {baseUrl}/identity/v1/oauth2/token
//! Authorization: Basic base64(clientId:clientSecret)
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=client_credentials&scope=https://api.ebay.com/oauth/api_scope
//! ```
//!
//! Tokens are fetched once per key cache miss and never cached here.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::client::{api_url, build_http_client};
use crate::config::{ClientConfig, EnvironmentCredentials};
use crate::error::{NotifyError, NotifyResult};
use crate::types::BearerToken;

/// Path of the OAuth token endpoint.
pub const IDENTITY_PATH: &str = "/identity/v1/oauth2/token";

/// Scope requested for application tokens.
pub const API_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Client-credentials token provider.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    client: reqwest::Client,
}

impl TokenProvider {
    /// Create a provider sharing an existing HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Create a provider with its own HTTP client.
    pub fn from_config(config: &ClientConfig) -> NotifyResult<Self> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Fetch a fresh application token for `creds`.
    pub async fn fetch_app_token(&self, creds: &EnvironmentCredentials) -> NotifyResult<BearerToken> {
        if creds.client_id.is_empty() || creds.client_secret.is_empty() {
            return Err(NotifyError::Config {
                message: format!("client credentials for {} are incomplete", creds.environment),
            });
        }

        let url = token_url(creds)?;
        debug!(url = %url, environment = %creds.environment, "requesting application token");

        let response = self
            .client
            .post(url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[
                ("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS),
                ("scope", API_SCOPE),
            ])
            .send()
            .await
            .map_err(|e| NotifyError::Network {
                message: format!("failed to request application token: {}", e),
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(NotifyError::Unauthorized {
                message: "client credentials rejected by token endpoint".to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Token {
                message: format!("HTTP {} - {}", status.as_u16(), body),
            });
        }

        let token_response: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| NotifyError::InvalidResponse {
                    message: format!("failed to parse token response: {}", e),
                })?;

        let access_token = token_response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NotifyError::Token {
                message: "response did not contain an access_token".to_string(),
            })?;

        debug!(
            expires_in = ?token_response.expires_in,
            token_type = ?token_response.token_type,
            "obtained application token"
        );

        Ok(BearerToken::new(access_token))
    }
}

fn token_url(creds: &EnvironmentCredentials) -> NotifyResult<Url> {
    api_url(creds, IDENTITY_PATH, &[])
}
