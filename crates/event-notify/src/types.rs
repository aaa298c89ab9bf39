//! Wire types for the notification protocol.

use serde::{Deserialize, Serialize};

/// HTTP header carrying the base64 signature envelope.
pub const SIGNATURE_HEADER: &str = "X-EBAY-SIGNATURE";

/// Topic of account deletion notifications.
pub const TOPIC_MARKETPLACE_ACCOUNT_DELETION: &str = "MARKETPLACE_ACCOUNT_DELETION";

/// Notification message as delivered by the platform.
///
/// Field order is significant: the signature covers the canonical
/// serialization of this struct (see [`crate::canonicalize`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub metadata: Metadata,
    pub notification: Notification,
}

impl Message {
    /// Message topic, used to select a handler.
    pub fn topic(&self) -> &str {
        &self.metadata.topic
    }
}

/// Notification metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub topic: String,

    #[serde(default)]
    pub schema_version: String,

    #[serde(default)]
    pub deprecated: bool,
}

/// Notification body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub notification_id: String,

    #[serde(default)]
    pub event_date: String,

    #[serde(default)]
    pub publish_date: String,

    #[serde(default)]
    pub publish_attempt_count: i64,

    /// Topic-specific payload, kept opaque and in received key order.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Decoded `X-EBAY-SIGNATURE` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHeader {
    /// Signature algorithm (e.g., "ecdsa").
    #[serde(rename = "alg", default)]
    pub algorithm: String,

    /// Key identifier of the signing key.
    #[serde(rename = "kid")]
    pub key_id: String,

    /// Base64 DER-encoded signature.
    pub signature: String,

    /// Digest algorithm (e.g., "SHA1").
    #[serde(rename = "digest", default)]
    pub digest_algorithm: String,
}

/// Public key as returned by the key distribution endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    /// Key identifier; not part of the response body.
    #[serde(skip)]
    pub key_id: String,

    /// PEM key material, possibly without line breaks.
    pub key: String,

    /// Key algorithm (e.g., "ECDSA").
    #[serde(default)]
    pub algorithm: String,

    /// Digest algorithm (e.g., "SHA1").
    #[serde(rename = "digest", default)]
    pub digest_algorithm: String,
}

/// OAuth application access token.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Body returned for an endpoint readiness challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub challenge_response: String,
}

/// Payload of a `MARKETPLACE_ACCOUNT_DELETION` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDeletionData {
    pub username: String,
    pub user_id: String,
    #[serde(default)]
    pub eias_token: String,
}
