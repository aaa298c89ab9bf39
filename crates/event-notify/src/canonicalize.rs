//! Canonical byte form of a notification message.
//!
//! The platform signs the compact JSON encoding of the message exactly as
//! its encoder produces it:
//!
//! - no insignificant whitespace
//! - `metadata` then `notification`, fields in declared order
//! - `data` object keys in the order they were received
//! - `<`, `>`, `&`, U+2028 and U+2029 inside strings written as `\u` escapes
//!
//! Any deviation changes the digest and fails verification.

use crate::error::{NotifyError, NotifyResult, VerifyStage};
use crate::types::Message;

/// Serialize `message` to its canonical signed bytes.
pub fn canonical_message_bytes(message: &Message) -> NotifyResult<Vec<u8>> {
    let json = serde_json::to_string(message).map_err(|e| {
        NotifyError::invalid_signature(
            VerifyStage::Canonicalize,
            format!("failed to serialize message: {}", e),
        )
    })?;

    Ok(escape_html_sensitive(&json).into_bytes())
}

/// Escape characters the sender's encoder never emits raw.
///
/// These characters can only occur inside string literals of serde_json
/// output, so a plain scan is safe.
fn escape_html_sensitive(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}
