//! Notification signature verification.
//!
//! The `X-EBAY-SIGNATURE` header carries a Base64 JSON envelope:
//!
//! ```json
//! {"alg":"ecdsa","kid":"<key id>","signature":"<base64 DER>","digest":"SHA1"}
//! ```
//!
//! Verification steps (each step stops on failure):
//!
//! 1. Decode the envelope (`MalformedHeader` on failure)
//! 2. Resolve the public key through the [`KeyCache`]
//! 3. Restore PEM line breaks around the markers
//! 4. Parse the SPKI P-256 public key
//! 5. Decode the DER signature
//! 6. SHA-1 over the canonical message bytes
//! 7. ECDSA verification of the prehashed digest
//!
//! SHA-1 is fixed by the platform's signing side and must not be changed
//! independently of it.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use tracing::{debug, warn};

use crate::cache::KeyCache;
use crate::canonicalize::canonical_message_bytes;
use crate::client::NotificationClient;
use crate::config::{ClientConfig, EnvironmentCredentials};
use crate::digest::sha1_bytes;
use crate::error::{NotifyError, NotifyResult, VerifyStage};
use crate::types::{Message, SignatureHeader};

/// PEM header line of a public key.
pub const KEY_BEGIN: &str = "-----BEGIN PUBLIC KEY-----";

/// PEM footer line of a public key.
pub const KEY_END: &str = "-----END PUBLIC KEY-----";

/// Signature algorithm used by the platform.
pub const ALGORITHM_ECDSA: &str = "ecdsa";

/// Digest algorithm used by the platform.
pub const DIGEST_SHA1: &str = "SHA1";

/// Verifies notification signatures against platform public keys.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    cache: KeyCache,
}

impl SignatureVerifier {
    pub fn new(cache: KeyCache) -> Self {
        Self { cache }
    }

    /// Verifier backed by the HTTP notification client.
    pub fn from_config(config: &ClientConfig) -> NotifyResult<Self> {
        let client = NotificationClient::new(config)?;
        Ok(Self::new(KeyCache::new(
            Arc::new(client),
            config.key_cache_capacity,
        )))
    }

    pub fn key_cache(&self) -> &KeyCache {
        &self.cache
    }

    /// Verify `message` against the Base64 `signature_header`.
    pub async fn verify(
        &self,
        message: &Message,
        signature_header: &str,
        creds: &EnvironmentCredentials,
    ) -> NotifyResult<()> {
        let header = decode_signature_header(signature_header)?;
        check_algorithms(&header)?;

        let record = self.cache.resolve(&header.key_id, creds).await?;

        let canonical = canonical_message_bytes(message)?;
        let result = verify_signed_bytes(&canonical, &header.signature, &record.key);

        match &result {
            Ok(()) => debug!(
                key_id = %header.key_id,
                notification_id = %message.notification.notification_id,
                "signature verified"
            ),
            Err(e) => warn!(
                key_id = %header.key_id,
                notification_id = %message.notification.notification_id,
                error = %e,
                "signature rejected"
            ),
        }

        result
    }
}

/// Decode the Base64 JSON signature envelope.
pub fn decode_signature_header(signature_header: &str) -> NotifyResult<SignatureHeader> {
    let bytes = BASE64
        .decode(signature_header.trim())
        .map_err(|e| NotifyError::malformed_header(format!("invalid base64: {}", e)))?;

    let header: SignatureHeader = serde_json::from_slice(&bytes)
        .map_err(|e| NotifyError::malformed_header(format!("invalid JSON envelope: {}", e)))?;

    if header.key_id.is_empty() {
        return Err(NotifyError::malformed_header("empty key id"));
    }
    if header.signature.is_empty() {
        return Err(NotifyError::malformed_header("empty signature"));
    }

    Ok(header)
}

fn check_algorithms(header: &SignatureHeader) -> NotifyResult<()> {
    if !header.algorithm.is_empty() && !header.algorithm.eq_ignore_ascii_case(ALGORITHM_ECDSA) {
        return Err(NotifyError::invalid_signature(
            VerifyStage::Header,
            format!("unsupported algorithm {}", header.algorithm),
        ));
    }
    if !header.digest_algorithm.is_empty()
        && !header.digest_algorithm.eq_ignore_ascii_case(DIGEST_SHA1)
    {
        return Err(NotifyError::invalid_signature(
            VerifyStage::Header,
            format!("unsupported digest {}", header.digest_algorithm),
        ));
    }
    Ok(())
}

/// Verify a Base64 DER ECDSA signature over SHA-1 of `payload`.
pub fn verify_signed_bytes(payload: &[u8], signature_b64: &str, public_key: &str) -> NotifyResult<()> {
    let key = parse_public_key(public_key)?;
    let signature = decode_signature(signature_b64)?;
    let digest = sha1_bytes(payload);

    key.verify_prehash(&digest, &signature).map_err(|_| {
        NotifyError::invalid_signature(VerifyStage::Verify, "ecdsa verification failed")
    })
}

/// Insert the line breaks a minified PEM key lost in transit.
pub fn format_public_key(key: &str) -> String {
    let mut key = key.trim().to_string();

    if let Some(pos) = key.find(KEY_BEGIN) {
        let after = pos + KEY_BEGIN.len();
        if !key[after..].starts_with('\n') && !key[after..].starts_with("\r\n") {
            key.insert(after, '\n');
        }
    }

    if let Some(pos) = key.find(KEY_END) {
        if !key[..pos].ends_with('\n') {
            key.insert(pos, '\n');
        }
    }

    key
}

/// Parse a PEM SPKI block into a P-256 verifying key.
fn parse_public_key(key: &str) -> NotifyResult<VerifyingKey> {
    let formatted = format_public_key(key);
    let der = decode_pem_block(&formatted)?;

    VerifyingKey::from_public_key_der(&der).map_err(|e| {
        NotifyError::invalid_signature(
            VerifyStage::PublicKey,
            format!("invalid public key: {}", e),
        )
    })
}

/// Extract the DER body of the public key PEM block.
///
/// Base64 line length is not enforced; the platform's keys are not wrapped
/// at 64 columns.
fn decode_pem_block(pem: &str) -> NotifyResult<Vec<u8>> {
    let no_block =
        || NotifyError::invalid_signature(VerifyStage::PublicKey, "no public key PEM block");

    let start = pem.find(KEY_BEGIN).ok_or_else(no_block)? + KEY_BEGIN.len();
    let end = pem[start..].find(KEY_END).ok_or_else(no_block)? + start;

    let body: String = pem[start..end]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if body.is_empty() {
        return Err(no_block());
    }

    BASE64.decode(body).map_err(|e| {
        NotifyError::invalid_signature(
            VerifyStage::PublicKey,
            format!("invalid PEM body: {}", e),
        )
    })
}

fn decode_signature(signature_b64: &str) -> NotifyResult<Signature> {
    let bytes = BASE64.decode(signature_b64.trim()).map_err(|e| {
        NotifyError::invalid_signature(
            VerifyStage::Signature,
            format!("invalid base64 signature: {}", e),
        )
    })?;

    Signature::from_der(&bytes).map_err(|e| {
        NotifyError::invalid_signature(
            VerifyStage::Signature,
            format!("invalid DER signature: {}", e),
        )
    })
}
