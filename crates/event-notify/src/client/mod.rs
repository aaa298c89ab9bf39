//! Notification API client for fetching public keys.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::auth::TokenProvider;
use crate::cache::KeyFetcher;
use crate::config::{ClientConfig, EnvironmentCredentials};
use crate::error::{NotifyError, NotifyResult};
use crate::types::PublicKeyRecord;

mod http;

pub(crate) use http::{api_url, build_http_client};
use http::HttpBackend;

/// Path of the public key endpoint; the key id is appended as a segment.
pub const PUBLIC_KEY_PATH: &str = "/commerce/notification/v1/public_key";

/// Client for the notification public key endpoint.
#[derive(Debug, Clone)]
pub struct NotificationClient {
    http: HttpBackend,
    tokens: TokenProvider,
}

impl NotificationClient {
    pub fn new(config: &ClientConfig) -> NotifyResult<Self> {
        let client = build_http_client(config)?;
        let tokens = TokenProvider::new(client.clone());
        Ok(Self::with_token_provider(client, tokens))
    }

    pub fn with_token_provider(client: reqwest::Client, tokens: TokenProvider) -> Self {
        Self {
            http: HttpBackend { client },
            tokens,
        }
    }

    /// Fetch the public key `key_id`, authenticating with a fresh app token.
    pub async fn fetch_public_key(
        &self,
        key_id: &str,
        creds: &EnvironmentCredentials,
    ) -> NotifyResult<PublicKeyRecord> {
        let token = self.tokens.fetch_app_token(creds).await?;

        let url = public_key_url(creds, key_id)?;
        debug!(url = %url, key_id = %key_id, "fetching public key");

        let mut record: PublicKeyRecord = self.http.get_json(url, &token).await?;
        if record.key.is_empty() {
            return Err(NotifyError::InvalidResponse {
                message: "public key response has no key material".to_string(),
            });
        }
        record.key_id = key_id.to_string();

        Ok(record)
    }

    pub fn token_provider(&self) -> &TokenProvider {
        &self.tokens
    }
}

#[async_trait]
impl KeyFetcher for NotificationClient {
    async fn fetch_public_key(
        &self,
        key_id: &str,
        creds: &EnvironmentCredentials,
    ) -> NotifyResult<PublicKeyRecord> {
        NotificationClient::fetch_public_key(self, key_id, creds).await
    }
}

fn public_key_url(creds: &EnvironmentCredentials, key_id: &str) -> NotifyResult<Url> {
    api_url(creds, PUBLIC_KEY_PATH, &[key_id])
}
