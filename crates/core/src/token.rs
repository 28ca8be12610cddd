//! Tamper-evident session cookie values.
//!
//! The cookie stored on the visitor's device is not the raw session
//! token: it is `base64url(token).issued_at.base64url(hmac)` where the
//! HMAC-SHA256 tag covers both the token and the issue timestamp. A
//! forged or aged-out cookie verifies to `None` rather than an error --
//! callers treat every failure mode uniformly as "no session".

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

fn signature(key: &[u8], token: &str, issued_at: i64) -> Vec<u8> {
    // HMAC accepts keys of any length, so new_from_slice cannot fail.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    mac.update(b"|");
    mac.update(issued_at.to_string().as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Produce the signed cookie value for a session token.
pub fn sign_token(token: &str, issued_at: Timestamp, key: &[u8]) -> String {
    let ts = issued_at.timestamp();
    let tag = signature(key, token, ts);
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(token.as_bytes()),
        ts,
        URL_SAFE_NO_PAD.encode(tag)
    )
}

/// Verify a signed cookie value, returning the embedded session token.
///
/// Returns `None` when the value is malformed, the signature does not
/// match, or the value is older than `max_age_secs` at `now`.
pub fn verify_token(raw: &str, key: &[u8], max_age_secs: i64, now: Timestamp) -> Option<String> {
    let mut parts = raw.splitn(3, '.');
    let token_b64 = parts.next()?;
    let ts_str = parts.next()?;
    let tag_b64 = parts.next()?;

    let token_bytes = URL_SAFE_NO_PAD.decode(token_b64).ok()?;
    let token = String::from_utf8(token_bytes).ok()?;
    let issued_at: i64 = ts_str.parse().ok()?;
    let claimed_tag = URL_SAFE_NO_PAD.decode(tag_b64).ok()?;

    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    mac.update(b"|");
    mac.update(issued_at.to_string().as_bytes());
    // verify_slice is constant-time.
    mac.verify_slice(&claimed_tag).ok()?;

    let age = now.timestamp() - issued_at;
    if age < 0 || age > max_age_secs {
        return None;
    }
    Some(token)
}
