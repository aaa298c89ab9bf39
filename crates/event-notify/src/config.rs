//! Deployment configuration.
//!
//! [`Config`] mirrors the platform's `config.json` layout: one credential
//! block per environment plus the endpoint registration used for challenge
//! responses. [`ClientConfig`] tunes the HTTP client and key cache.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NotifyError, NotifyResult, ValidationError};

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "SANDBOX",
            Self::Production => "PRODUCTION",
        }
    }

    /// API base URL used when the credential block leaves `baseUrl` empty.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://api.sandbox.ebay.com",
            Self::Production => "https://api.ebay.com",
        }
    }
}

impl FromStr for Environment {
    type Err = ValidationError;

    /// Exact, case-sensitive match on `SANDBOX` / `PRODUCTION`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SANDBOX" => Ok(Self::Sandbox),
            "PRODUCTION" => Ok(Self::Production),
            _ => Err(ValidationError::InvalidEnvironment),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential block for one environment, as stored in `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub redirect_uri: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(rename = "devid", default)]
    pub dev_id: String,
}

impl EnvironmentConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Full notification configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "SANDBOX", default)]
    pub sandbox: EnvironmentConfig,

    #[serde(rename = "PRODUCTION", default)]
    pub production: EnvironmentConfig,

    /// Registered webhook URL, part of the challenge digest.
    #[serde(default)]
    pub endpoint: String,

    /// Verification token registered with the platform.
    #[serde(rename = "verificationToken", default)]
    pub verification_token: String,
}

impl Config {
    /// Parse configuration from a JSON document.
    pub fn from_json(json: &str) -> NotifyResult<Self> {
        serde_json::from_str(json).map_err(|e| NotifyError::Config {
            message: format!("failed to parse config: {}", e),
        })
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> NotifyResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| NotifyError::Config {
            message: format!("failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_json(&content)
    }

    pub fn environment(&self, environment: Environment) -> &EnvironmentConfig {
        match environment {
            Environment::Sandbox => &self.sandbox,
            Environment::Production => &self.production,
        }
    }

    /// Credentials for the selected environment.
    pub fn credentials(&self, environment: Environment) -> EnvironmentCredentials {
        let block = self.environment(environment);
        EnvironmentCredentials {
            base_url: block.base_url.clone(),
            client_id: block.client_id.clone(),
            client_secret: block.client_secret.clone(),
            redirect_uri: block.redirect_uri.clone(),
            dev_id: block.dev_id.clone(),
            environment,
        }
    }

    pub fn with_sandbox(mut self, sandbox: EnvironmentConfig) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_production(mut self, production: EnvironmentConfig) -> Self {
        self.production = production;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_verification_token(mut self, token: impl Into<String>) -> Self {
        self.verification_token = token.into();
        self
    }
}

/// Credentials of the environment a request is verified against.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvironmentCredentials {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub dev_id: String,
    pub environment: Environment,
}

impl EnvironmentCredentials {
    /// Normalized API base URL.
    ///
    /// An empty `base_url` falls back to the environment default, and a bare
    /// host such as `api.ebay.com` is given an `https://` scheme.
    pub fn api_base(&self) -> String {
        let base = self.base_url.trim();
        let base = if base.is_empty() {
            self.environment.default_base_url().to_string()
        } else if base.contains("://") {
            base.to_string()
        } else {
            format!("https://{}", base)
        };
        base.trim_end_matches('/').to_string()
    }
}

impl fmt::Debug for EnvironmentCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentCredentials")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("environment", &self.environment)
            .finish()
    }
}

/// HTTP client and key cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout in seconds, applied to token and key calls.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of cached public keys.
    #[serde(default = "default_key_cache_capacity")]
    pub key_cache_capacity: usize,
}

fn default_timeout() -> u64 {
    10
}

fn default_key_cache_capacity() -> usize {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            key_cache_capacity: default_key_cache_capacity(),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `EVENT_NOTIFY_TIMEOUT` | Request timeout in seconds (default: 10) |
    /// | `EVENT_NOTIFY_KEY_CACHE_CAPACITY` | Cached public keys (default: 100) |
    pub fn from_env() -> Self {
        Self {
            timeout_secs: std::env::var("EVENT_NOTIFY_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            key_cache_capacity: std::env::var("EVENT_NOTIFY_KEY_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or_else(default_key_cache_capacity),
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_key_cache_capacity(mut self, capacity: usize) -> Self {
        self.key_cache_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const CONFIG_JSON: &str = r#"{
        "SANDBOX": {
            "clientId": "sandbox-id",
            "clientSecret": "sandbox-secret",
            "devid": "dev-1",
            "redirectUri": "sandbox-ru",
            "baseUrl": "api.sandbox.ebay.com"
        },
        "PRODUCTION": {
            "clientId": "prod-id",
            "clientSecret": "prod-secret",
            "devid": "dev-1",
            "redirectUri": "prod-ru",
            "baseUrl": "api.ebay.com"
        },
        "endpoint": "https://example.com/webhook",
        "verificationToken": "71745723-d031-455c-bfa5-f90d11b4f20a"
    }"#;

    #[test]
    fn test_environment_parse_is_case_sensitive() {
        assert_eq!("SANDBOX".parse::<Environment>(), Ok(Environment::Sandbox));
        assert_eq!(
            "PRODUCTION".parse::<Environment>(),
            Ok(Environment::Production)
        );
        assert_eq!(
            "sandbox".parse::<Environment>(),
            Err(ValidationError::InvalidEnvironment)
        );
        assert_eq!(
            "".parse::<Environment>(),
            Err(ValidationError::InvalidEnvironment)
        );
    }

    #[test]
    fn test_config_from_json() {
        let config = Config::from_json(CONFIG_JSON).unwrap();
        assert_eq!(config.sandbox.client_id, "sandbox-id");
        assert_eq!(config.production.dev_id, "dev-1");
        assert_eq!(config.endpoint, "https://example.com/webhook");
        assert_eq!(
            config.verification_token,
            "71745723-d031-455c-bfa5-f90d11b4f20a"
        );
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, CONFIG_JSON).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.production.client_secret, "prod-secret");

        let missing = Config::from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(NotifyError::Config { .. })));
    }

    #[test]
    fn test_credentials_selects_environment() {
        let config = Config::from_json(CONFIG_JSON).unwrap();
        let creds = config.credentials(Environment::Sandbox);
        assert_eq!(creds.client_id, "sandbox-id");
        assert_eq!(creds.environment, Environment::Sandbox);
        assert_eq!(creds.api_base(), "https://api.sandbox.ebay.com");
    }

    #[test]
    fn test_api_base_normalization() {
        let mut creds = Config::default().credentials(Environment::Production);
        assert_eq!(creds.api_base(), "https://api.ebay.com");

        creds.base_url = "http://127.0.0.1:8080/".to_string();
        assert_eq!(creds.api_base(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let config = Config::from_json(CONFIG_JSON).unwrap();
        let rendered = format!("{:?}", config.credentials(Environment::Production));
        assert!(!rendered.contains("prod-secret"));
        assert!(rendered.contains("prod-id"));
    }

    #[test]
    #[serial]
    fn test_client_config_from_env() {
        std::env::set_var("EVENT_NOTIFY_TIMEOUT", "3");
        std::env::set_var("EVENT_NOTIFY_KEY_CACHE_CAPACITY", "0");
        let config = ClientConfig::from_env();
        std::env::remove_var("EVENT_NOTIFY_TIMEOUT");
        std::env::remove_var("EVENT_NOTIFY_KEY_CACHE_CAPACITY");

        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.key_cache_capacity, 100);
    }

    #[test]
    #[serial]
    fn test_client_config_defaults() {
        std::env::remove_var("EVENT_NOTIFY_TIMEOUT");
        std::env::remove_var("EVENT_NOTIFY_KEY_CACHE_CAPACITY");

        assert_eq!(ClientConfig::from_env(), ClientConfig::default());
        let config = ClientConfig::default()
            .with_timeout_secs(5)
            .with_key_cache_capacity(2);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.key_cache_capacity, 2);
    }
}
