//! Verification of marketplace event notifications.
//!
//! This crate implements the receiving side of the platform's webhook
//! notifications, providing:
//!
//! - OAuth client-credentials token acquisition
//! - Public key fetching with a bounded LRU cache
//! - ECDSA signature verification of notification messages
//! - Endpoint readiness challenge responses
//! - A validation pipeline mapping verdicts to HTTP status codes
//!
//! # Quick Start
//!
//! ```no_run
//! use event_notify::{ClientConfig, Config, Message, ValidationPipeline};
//!
//! # async fn example(message: Message, signature: &str) -> anyhow::Result<()> {
//! let config = Config::from_file("config.json")?;
//! let pipeline = ValidationPipeline::from_client_config(&ClientConfig::from_env())?;
//!
//! let outcome = pipeline
//!     .validate_and_process(Some(&message), signature, Some(&config), "PRODUCTION")
//!     .await?;
//! println!("respond with {}", outcome.status_code());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `EVENT_NOTIFY_TIMEOUT` | Request timeout in seconds (default: 10) |
//! | `EVENT_NOTIFY_KEY_CACHE_CAPACITY` | Maximum cached public keys (default: 100) |

pub mod auth;
pub mod cache;
pub mod canonicalize;
pub mod challenge;
pub mod client;
pub mod config;
mod digest;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod types;
pub mod verify;

// Re-export main types
pub use auth::TokenProvider;
pub use cache::{KeyCache, KeyFetcher, DEFAULT_KEY_CACHE_CAPACITY};
pub use canonicalize::canonical_message_bytes;
pub use challenge::respond as challenge_respond;
pub use client::NotificationClient;
pub use config::{ClientConfig, Config, Environment, EnvironmentConfig, EnvironmentCredentials};
pub use error::{NotifyError, NotifyResult, ValidationError, VerifyStage};
pub use pipeline::{validate_endpoint, ProcessOutcome, ValidationPipeline};
pub use processor::{AccountDeletionHandler, HandlerRegistry, MessageHandler};
pub use types::{
    AccountDeletionData, BearerToken, ChallengeResponse, Message, Metadata, Notification,
    PublicKeyRecord, SignatureHeader, SIGNATURE_HEADER, TOPIC_MARKETPLACE_ACCOUNT_DELETION,
};
pub use verify::{decode_signature_header, SignatureVerifier};
