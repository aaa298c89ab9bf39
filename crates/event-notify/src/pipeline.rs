//! Request validation and dispatch.
//!
//! [`ValidationPipeline::validate_and_process`] is the entry point for an
//! inbound notification. Preconditions are checked in a fixed order and the
//! first failure is returned as a [`ValidationError`]. Once they pass, the
//! signature is verified and the message is dispatched to its topic
//! handler; the verdict is reported as a [`ProcessOutcome`] carrying the
//! HTTP status to answer with.

use tracing::{info, warn};

use crate::challenge::challenge_response;
use crate::config::{ClientConfig, Config, Environment};
use crate::error::{NotifyError, NotifyResult, ValidationError};
use crate::processor::HandlerRegistry;
use crate::types::{ChallengeResponse, Message};
use crate::verify::SignatureVerifier;

/// Status code for a processed notification.
pub const STATUS_NO_CONTENT: u16 = 204;

/// Status code for a rejected signature.
pub const STATUS_PRECONDITION_FAILED: u16 = 412;

/// Status code for any other failure.
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

/// Result of processing a notification that passed validation.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// Signature verified and the message was handled.
    Processed,
    /// The signature did not verify.
    SignatureRejected { error: NotifyError },
    /// Verification could not complete or the handler failed.
    Failed { error: NotifyError },
}

impl ProcessOutcome {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Processed => STATUS_NO_CONTENT,
            Self::SignatureRejected { .. } => STATUS_PRECONDITION_FAILED,
            Self::Failed { .. } => STATUS_INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed)
    }

    pub fn error(&self) -> Option<&NotifyError> {
        match self {
            Self::Processed => None,
            Self::SignatureRejected { error } | Self::Failed { error } => Some(error),
        }
    }

    fn from_result(result: NotifyResult<()>) -> Self {
        match result {
            Ok(()) => Self::Processed,
            Err(error) if error.is_signature_rejection() => Self::SignatureRejected { error },
            Err(error) => Self::Failed { error },
        }
    }
}

/// Verifies notifications and dispatches them to topic handlers.
#[derive(Debug, Clone)]
pub struct ValidationPipeline {
    verifier: SignatureVerifier,
    handlers: HandlerRegistry,
}

impl ValidationPipeline {
    pub fn new(verifier: SignatureVerifier, handlers: HandlerRegistry) -> Self {
        Self { verifier, handlers }
    }

    /// Pipeline with the HTTP-backed verifier and built-in handlers.
    pub fn from_client_config(config: &ClientConfig) -> NotifyResult<Self> {
        Ok(Self::new(
            SignatureVerifier::from_config(config)?,
            HandlerRegistry::new(),
        ))
    }

    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Validate, verify and dispatch one notification.
    ///
    /// Gates, first failure wins: message, signature, config, client IDs of
    /// both environments, client secrets of both environments, environment
    /// name (`SANDBOX` or `PRODUCTION`, case-sensitive).
    pub async fn validate_and_process(
        &self,
        message: Option<&Message>,
        signature: &str,
        config: Option<&Config>,
        environment: &str,
    ) -> Result<ProcessOutcome, ValidationError> {
        let message = message.ok_or(ValidationError::MissingMessage)?;
        if signature.is_empty() {
            return Err(ValidationError::MissingSignature);
        }
        let config = config.ok_or(ValidationError::MissingConfig)?;
        if config.sandbox.client_id.is_empty() || config.production.client_id.is_empty() {
            return Err(ValidationError::MissingClientId);
        }
        if config.sandbox.client_secret.is_empty() || config.production.client_secret.is_empty() {
            return Err(ValidationError::MissingClientSecret);
        }
        let environment: Environment = environment.parse()?;

        let creds = config.credentials(environment);
        let result = match self.verifier.verify(message, signature, &creds).await {
            Ok(()) => self.handlers.dispatch(message),
            Err(e) => Err(e),
        };

        let outcome = ProcessOutcome::from_result(result);
        match outcome.error() {
            None => info!(
                topic = %message.topic(),
                notification_id = %message.notification.notification_id,
                environment = %environment,
                "notification processed"
            ),
            Some(error) => warn!(
                topic = %message.topic(),
                notification_id = %message.notification.notification_id,
                environment = %environment,
                status = outcome.status_code(),
                error = %error,
                "notification not processed"
            ),
        }

        Ok(outcome)
    }
}

/// Answer an endpoint readiness challenge.
///
/// Gates: challenge code, config, endpoint, verification token.
pub fn validate_endpoint(
    challenge_code: &str,
    config: Option<&Config>,
) -> Result<ChallengeResponse, ValidationError> {
    if challenge_code.is_empty() {
        return Err(ValidationError::MissingChallengeCode);
    }
    let config = config.ok_or(ValidationError::MissingConfig)?;
    if config.endpoint.is_empty() {
        return Err(ValidationError::MissingEndpoint);
    }
    if config.verification_token.is_empty() {
        return Err(ValidationError::MissingVerificationToken);
    }

    Ok(challenge_response(
        challenge_code,
        &config.verification_token,
        &config.endpoint,
    ))
}
