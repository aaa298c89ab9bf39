//! Endpoint readiness challenge.
//!
//! When an endpoint is registered the platform sends a `challenge_code` and
//! expects `hex(SHA-256(challenge_code || verification_token || endpoint))`
//! back, proving the endpoint knows the registered token.

use crate::digest::sha256_hex_parts;
use crate::types::ChallengeResponse;

/// Compute the challenge response digest.
///
/// Inputs are concatenated as raw UTF-8 with no separators; empty inputs
/// are hashed as-is.
pub fn respond(challenge_code: &str, verification_token: &str, endpoint: &str) -> String {
    sha256_hex_parts(&[
        challenge_code.as_bytes(),
        verification_token.as_bytes(),
        endpoint.as_bytes(),
    ])
}

/// Challenge response wrapped in its JSON body.
pub fn challenge_response(
    challenge_code: &str,
    verification_token: &str,
    endpoint: &str,
) -> ChallengeResponse {
    ChallengeResponse {
        challenge_response: respond(challenge_code, verification_token, endpoint),
    }
}
