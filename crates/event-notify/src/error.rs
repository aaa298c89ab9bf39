//! Error types for notification verification.

use std::fmt;

/// Precondition failures reported by the validation pipeline.
///
/// This is a closed set: callers may match on the variant or compare the
/// rendered message, both are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing Message")]
    MissingMessage,

    #[error("Missing Signature")]
    MissingSignature,

    #[error("Missing Config")]
    MissingConfig,

    #[error("Missing Client ID")]
    MissingClientId,

    #[error("Missing Client Secret")]
    MissingClientSecret,

    #[error("Invalid Environment")]
    InvalidEnvironment,

    #[error("Missing Challenge Code")]
    MissingChallengeCode,

    #[error("Missing Endpoint")]
    MissingEndpoint,

    #[error("Missing Verification Token")]
    MissingVerificationToken,
}

/// Stage of signature verification that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStage {
    /// Algorithm or digest named by the signature header.
    Header,
    /// PEM / SPKI decoding of the public key.
    PublicKey,
    /// Base64 / DER decoding of the signature bytes.
    Signature,
    /// Canonical serialization of the message.
    Canonicalize,
    /// The ECDSA check itself.
    Verify,
}

impl fmt::Display for VerifyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::PublicKey => "public-key",
            Self::Signature => "signature",
            Self::Canonicalize => "canonicalize",
            Self::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// Notification errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A pipeline precondition was not met.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The signature header could not be decoded.
    #[error("malformed signature header: {reason}")]
    MalformedHeader { reason: String },

    /// The public key for `key_id` could not be resolved.
    #[error("failed to fetch public key {key_id}: {source}")]
    KeyFetch {
        key_id: String,
        #[source]
        source: Box<NotifyError>,
    },

    /// Signature verification failed.
    #[error("signature verification failed at {stage}: {reason}")]
    InvalidSignature { stage: VerifyStage, reason: String },

    /// No handler is registered for the message topic.
    #[error("no message handler registered for topic {topic}")]
    UnsupportedTopic { topic: String },

    /// A registered handler rejected the message.
    #[error("handler for {topic} failed: {message}")]
    Handler { topic: String, message: String },

    /// OAuth token acquisition failed.
    #[error("token request failed: {message}")]
    Token { message: String },

    /// Authentication rejected by the platform.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Network error.
    #[error("network error: {message}")]
    Network { message: String },

    /// Invalid response from the platform.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl NotifyError {
    pub(crate) fn malformed_header(reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_signature(stage: VerifyStage, reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            stage,
            reason: reason.into(),
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Caller / config issues
            Self::Validation(_) => 1,
            Self::Config { .. } => 1,
            Self::UnsupportedTopic { .. } => 1,

            // Auth issues (2 is the CLI's own setup failure)
            Self::Unauthorized { .. } => 3,
            Self::Token { .. } => 3,

            // Signature rejected
            Self::MalformedHeader { .. } => 4,
            Self::InvalidSignature { .. } => 4,

            // Network/transient
            Self::KeyFetch { .. } => 5,
            Self::Network { .. } => 5,

            // Other
            Self::InvalidResponse { .. } => 6,
            Self::Handler { .. } => 6,
        }
    }

    /// Whether the sender's signature was checked and found wrong, as
    /// opposed to verification not being possible at all.
    pub fn is_signature_rejection(&self) -> bool {
        matches!(self, Self::InvalidSignature { .. })
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;
